//! Message decoding pipeline
//!
//! Every inbound message runs through an ordered chain of extraction
//! strategies over a shared [`MessageContext`]:
//! 1. [`envelope::BinaryPositionStrategy`] - structured binary decode
//! 2. [`text::TextFallbackStrategy`] - heuristic text extraction with
//!    synthetic placeholder coordinates
//!
//! The first strategy to yield a node wins. A message no strategy can use is
//! discarded; that is routine traffic on a shared topic, not a fault. New
//! message types slot in as additional strategies without touching the
//! coordinator.

pub mod envelope;
pub mod text;

use chrono::{DateTime, Utc};
use meshmap_common::model::LiveNode;

use text::TextHints;

/// Everything a strategy may consult about one inbound message.
pub struct MessageContext<'a> {
    /// Topic the message arrived on.
    pub topic: &'a str,
    /// Region segment parsed from the topic, when present.
    pub region: Option<String>,
    /// Raw message bytes as delivered by the broker.
    pub payload: &'a [u8],
    /// Text hints, extracted once per message regardless of decode path.
    pub hints: TextHints,
    /// Receive time; becomes the entry timestamp that drives eviction.
    pub received_at: DateTime<Utc>,
}

/// One way of turning an inbound message into a live node entry.
///
/// Returning `None` is an ordinary, expected outcome (structural mismatch,
/// truncated input, missing patterns), never an error.
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name for log provenance.
    fn name(&self) -> &'static str;

    fn attempt(&self, ctx: &MessageContext<'_>) -> Option<LiveNode>;
}

/// The standard binary-first, text-fallback chain.
pub fn default_chain() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(envelope::BinaryPositionStrategy),
        Box::new(text::TextFallbackStrategy),
    ]
}
