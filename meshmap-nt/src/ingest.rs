//! Ingestion coordinator
//!
//! The only component with side effects per message: runs the text extractor,
//! walks the strategy chain, and writes the first usable result into the
//! registry. Messages no strategy can use are dropped without comment beyond
//! a debug line; malformed traffic on a shared topic is routine. All decode
//! failures are values (`None`), so a bad message can never take down the
//! subscriber loop.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::decode::{self, text, ExtractionStrategy, MessageContext};
use crate::registry::LiveNodeRegistry;

pub struct IngestCoordinator {
    registry: Arc<LiveNodeRegistry>,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl IngestCoordinator {
    pub fn new(registry: Arc<LiveNodeRegistry>) -> Self {
        Self {
            registry,
            strategies: decode::default_chain(),
        }
    }

    /// Handle one inbound message. Synchronous and non-blocking; never fails.
    pub fn handle_message(&self, topic: &str, payload: &[u8]) {
        let ctx = MessageContext {
            topic,
            region: region_from_topic(topic),
            payload,
            // Extracted up front: binary-decoded entries still take their
            // name and firmware from the text framing.
            hints: text::extract_hints(payload),
            received_at: Utc::now(),
        };

        for strategy in &self.strategies {
            if let Some(node) = strategy.attempt(&ctx) {
                info!(
                    strategy = strategy.name(),
                    id = %node.id,
                    name = %node.name,
                    lat = node.latitude,
                    lon = node.longitude,
                    "live node updated"
                );
                self.registry.upsert(node);
                return;
            }
        }

        debug!(topic, len = payload.len(), "message yielded no usable node");
    }
}

/// Second segment of the topic path, e.g. `msh/US/2/e/...` -> `US`.
fn region_from_topic(topic: &str) -> Option<String> {
    topic.split('/').nth(1).map(str::to_string)
}
