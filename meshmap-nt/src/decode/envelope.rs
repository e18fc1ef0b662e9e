//! Binary envelope decoder
//!
//! Decodes the three-level wire structure gateways publish on the mesh
//! topics: a `ServiceEnvelope` wrapping a `MeshPacket`, whose `Data` payload
//! carries a `Position` when the port number is `POSITION_APP`. Only the
//! fields this service reads are declared; unknown fields are skipped by the
//! protobuf wire format.

use meshmap_common::model::{LiveNode, TransmissionKind};
use prost::Message;

use super::{ExtractionStrategy, MessageContext};

/// Port number of position payloads.
pub const POSITION_APP: u32 = 3;

/// Coordinates are transmitted as integer degrees scaled by 1e7.
const COORD_SCALE: f64 = 10_000_000.0;

/// Outer wrapper identifying the publishing gateway and channel.
#[derive(Clone, PartialEq, Message)]
pub struct ServiceEnvelope {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<MeshPacket>,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub gateway_id: String,
}

/// Routing structure around a typed payload.
#[derive(Clone, PartialEq, Message)]
pub struct MeshPacket {
    #[prost(fixed32, tag = "1")]
    pub from: u32,
    #[prost(fixed32, tag = "2")]
    pub to: u32,
    #[prost(message, optional, tag = "3")]
    pub decoded: Option<Data>,
    #[prost(fixed32, tag = "4")]
    pub id: u32,
    #[prost(fixed32, tag = "5")]
    pub rx_time: u32,
    #[prost(float, tag = "6")]
    pub rx_snr: f32,
    #[prost(uint32, tag = "7")]
    pub hop_limit: u32,
    #[prost(bool, tag = "8")]
    pub want_ack: bool,
    #[prost(uint32, tag = "9")]
    pub priority: u32,
    #[prost(int32, tag = "10")]
    pub rx_rssi: i32,
}

/// Typed payload: a port number and opaque bytes.
#[derive(Clone, PartialEq, Message)]
pub struct Data {
    #[prost(uint32, tag = "1")]
    pub portnum: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

/// Fixed-point position report.
#[derive(Clone, PartialEq, Message)]
pub struct Position {
    #[prost(sfixed32, tag = "1")]
    pub latitude_i: i32,
    #[prost(sfixed32, tag = "2")]
    pub longitude_i: i32,
    #[prost(int32, tag = "3")]
    pub altitude: i32,
    #[prost(fixed32, tag = "4")]
    pub time: u32,
}

/// A successfully decoded position report.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// Sender id, zero-padded lowercase hex.
    pub node_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub snr: Option<f32>,
    pub rssi: Option<i32>,
    /// Fix timestamp embedded in the payload, when the sender set one.
    pub time: Option<u32>,
}

/// Decode a raw message down to a position fix.
///
/// Returns `None` on any structural mismatch, truncated input, or a payload
/// type other than `POSITION_APP`. Callers treat that as ordinary traffic;
/// nothing is logged here.
pub fn decode_position(raw: &[u8]) -> Option<PositionFix> {
    let envelope = ServiceEnvelope::decode(raw).ok()?;
    let packet = envelope.packet?;
    let data = packet.decoded?;
    if data.portnum != POSITION_APP {
        return None;
    }
    let position = Position::decode(data.payload.as_slice()).ok()?;

    Some(PositionFix {
        node_id: format!("{:08x}", packet.from),
        latitude: f64::from(position.latitude_i) / COORD_SCALE,
        longitude: f64::from(position.longitude_i) / COORD_SCALE,
        // Wire default zero means the sender did not report the field.
        snr: (packet.rx_snr != 0.0).then_some(packet.rx_snr),
        rssi: (packet.rx_rssi != 0).then_some(packet.rx_rssi),
        time: (position.time != 0).then_some(position.time),
    })
}

/// In-range and not the 0/0 "no fix" sentinel.
pub fn is_valid_fix(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
        && latitude != 0.0
        && longitude != 0.0
}

/// Binary decode path: a validated position fix plus text-extracted metadata.
pub struct BinaryPositionStrategy;

impl ExtractionStrategy for BinaryPositionStrategy {
    fn name(&self) -> &'static str {
        "binary_position"
    }

    fn attempt(&self, ctx: &MessageContext<'_>) -> Option<LiveNode> {
        let fix = decode_position(ctx.payload)?;
        if !is_valid_fix(fix.latitude, fix.longitude) {
            return None;
        }

        Some(LiveNode {
            id: fix.node_id,
            // Names and firmware are not part of the position payload; they
            // come from the text framing around it, when present.
            name: ctx.hints.name_or_default(),
            short_name: ctx.hints.short_name_or_default(),
            firmware: ctx.hints.firmware_or_default(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: ctx.received_at,
            topic: ctx.topic.to_string(),
            region: ctx.region.clone(),
            kind: TransmissionKind::LiveTransmission,
            snr: fix.snr,
            rssi: fix.rssi,
            time: fix.time,
        })
    }
}
