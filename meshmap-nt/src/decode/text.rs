//! Heuristic text extractor
//!
//! Scans raw message bytes, viewed as lossy UTF-8, for recognizable
//! substrings: a name/short-name pair, a `!`-prefixed hex node id, and a
//! firmware version. Runs on every message regardless of binary decode
//! outcome, because names and firmware are not part of the binary position
//! payload and can only be recovered from the surrounding text framing.

use meshmap_common::model::{LiveNode, TransmissionKind, UNKNOWN};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use super::{ExtractionStrategy, MessageContext};

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_SHORT_NAME: &str = "UNK";

/// Synthetic placeholder coordinate ranges for fallback entries. Chosen to
/// land somewhere plausible on the continental map; the `type` field is what
/// marks them as non-measured.
pub const FALLBACK_LAT_RANGE: std::ops::Range<f64> = 25.0..50.0;
pub const FALLBACK_LON_RANGE: std::ops::Range<f64> = -125.0..-75.0;

static NAME_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z0-9-]{3,})\s+([A-Z0-9-]{2,})").expect("hardcoded pattern"));
static NODE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!([a-f0-9]{8})").expect("hardcoded pattern"));
static FIRMWARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+\.[a-f0-9]+)").expect("hardcoded pattern"));

/// Best-effort metadata recovered from the text view of a message.
///
/// Every field is independently optional; a miss is not a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextHints {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub node_id: Option<String>,
    pub firmware: Option<String>,
}

impl TextHints {
    pub fn name_or_default(&self) -> String {
        self.name.clone().unwrap_or_else(|| DEFAULT_NAME.to_string())
    }

    pub fn short_name_or_default(&self) -> String {
        self.short_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SHORT_NAME.to_string())
    }

    pub fn firmware_or_default(&self) -> String {
        self.firmware.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// Scan `raw` for the three patterns. Always succeeds; missing patterns
/// leave their fields `None`.
pub fn extract_hints(raw: &[u8]) -> TextHints {
    let text = String::from_utf8_lossy(raw);
    let mut hints = TextHints::default();

    if let Some(caps) = NAME_PAIR.captures(&text) {
        hints.name = Some(caps[1].to_string());
        hints.short_name = Some(caps[2].to_string());
    }
    if let Some(caps) = NODE_ID.captures(&text) {
        hints.node_id = Some(caps[1].to_string());
    }
    if let Some(caps) = FIRMWARE.captures(&text) {
        hints.firmware = Some(caps[1].to_string());
    }

    hints
}

/// Fallback path: when the binary decode yields nothing usable but the text
/// framing carried both a name pair and a node id, record the node with
/// synthetic placeholder coordinates.
pub struct TextFallbackStrategy;

impl ExtractionStrategy for TextFallbackStrategy {
    fn name(&self) -> &'static str {
        "text_fallback"
    }

    fn attempt(&self, ctx: &MessageContext<'_>) -> Option<LiveNode> {
        let name = ctx.hints.name.clone()?;
        let short_name = ctx.hints.short_name.clone()?;
        let id = ctx.hints.node_id.clone()?;

        let mut rng = rand::thread_rng();
        Some(LiveNode {
            id,
            name,
            short_name,
            firmware: ctx.hints.firmware_or_default(),
            latitude: rng.gen_range(FALLBACK_LAT_RANGE),
            longitude: rng.gen_range(FALLBACK_LON_RANGE),
            timestamp: ctx.received_at,
            topic: ctx.topic.to_string(),
            region: ctx.region.clone(),
            kind: TransmissionKind::LiveTransmissionFallback,
            snr: None,
            rssi: None,
            time: None,
        })
    }
}
