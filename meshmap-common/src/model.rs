//! Wire-facing data model shared by the tracker service and its tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a metadata field could not be recovered from a message.
pub const UNKNOWN: &str = "unknown";

/// How a live node entry was produced.
///
/// Downstream consumers use this to judge coordinate confidence, so the
/// distinction is carried on every entry and never collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionKind {
    /// Position decoded from the binary envelope; coordinates are measured.
    LiveTransmission,
    /// Heuristic text extraction only; coordinates are synthetic placeholders.
    LiveTransmissionFallback,
}

/// One currently-live mesh node, keyed by its 8-hex-digit identifier.
///
/// Entries are overwritten in place on every new message for the same id
/// (last-write-wins, no field merge) and expire 10 minutes after their
/// `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveNode {
    /// Stable node identifier: zero-padded lowercase 8-hex-digit string.
    pub id: String,
    /// Long node name, best-effort ("Unknown" when not recoverable).
    pub name: String,
    /// Short node name, best-effort ("UNK" when not recoverable).
    pub short_name: String,
    /// Firmware version string, best-effort ("unknown" when not recoverable).
    pub firmware: String,
    /// Decimal degrees. Synthetic for fallback entries.
    pub latitude: f64,
    /// Decimal degrees. Synthetic for fallback entries.
    pub longitude: f64,
    /// Wall-clock time of the last update; drives staleness eviction.
    pub timestamp: DateTime<Utc>,
    /// Subscription topic the message arrived on.
    pub topic: String,
    /// Region segment parsed from the topic, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransmissionKind,
    /// Signal-to-noise ratio, binary-decoded entries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snr: Option<f32>,
    /// Received signal strength, binary-decoded entries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    /// Position fix timestamp embedded in the payload, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
}

/// One node from an external inventory source, after normalization.
///
/// Sources disagree on field names and some omit identity entirely, so
/// everything but the coordinates is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}
