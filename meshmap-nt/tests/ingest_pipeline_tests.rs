//! End-to-end decoding pipeline tests: raw message bytes in, registry
//! contents out.

use meshmap_common::model::TransmissionKind;
use meshmap_nt::decode::envelope::{Data, MeshPacket, Position, ServiceEnvelope, POSITION_APP};
use meshmap_nt::decode::text::{FALLBACK_LAT_RANGE, FALLBACK_LON_RANGE};
use meshmap_nt::ingest::IngestCoordinator;
use meshmap_nt::registry::LiveNodeRegistry;
use prost::Message;
use std::sync::Arc;

const TOPIC: &str = "msh/US/2/e/LongFast/!1a2b3c4d";

fn setup() -> (IngestCoordinator, Arc<LiveNodeRegistry>) {
    let registry = Arc::new(LiveNodeRegistry::new());
    let coordinator = IngestCoordinator::new(Arc::clone(&registry));
    (coordinator, registry)
}

fn position_message(from: u32, latitude_i: i32, longitude_i: i32) -> Vec<u8> {
    ServiceEnvelope {
        packet: Some(MeshPacket {
            from,
            to: 0xffffffff,
            decoded: Some(Data {
                portnum: POSITION_APP,
                payload: Position {
                    latitude_i,
                    longitude_i,
                    altitude: 0,
                    time: 0,
                }
                .encode_to_vec(),
            }),
            id: 7,
            rx_time: 0,
            rx_snr: 8.75,
            hop_limit: 3,
            want_ack: false,
            priority: 0,
            rx_rssi: -88,
        }),
        channel_id: "LongFast".to_string(),
        gateway_id: "!1a2b3c4d".to_string(),
    }
    .encode_to_vec()
}

#[test]
fn binary_position_reaches_registry() {
    let (coordinator, registry) = setup();
    coordinator.handle_message(TOPIC, &position_message(0x1A2B3C4D, 377_749_000, -1_224_194_000));

    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.id, "1a2b3c4d");
    assert!((node.latitude - 37.7749).abs() < 1e-6);
    assert!((node.longitude - -122.4194).abs() < 1e-6);
    assert_eq!(node.kind, TransmissionKind::LiveTransmission);
    assert_eq!(node.topic, TOPIC);
    assert_eq!(node.region.as_deref(), Some("US"));
    assert_eq!(node.snr, Some(8.75));
    assert_eq!(node.rssi, Some(-88));
}

#[test]
fn text_fallback_reaches_registry() {
    let (coordinator, registry) = setup();
    coordinator.handle_message(TOPIC, b"NODE-ONE NO1 !deadbeef");

    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.id, "deadbeef");
    assert_eq!(node.name, "NODE-ONE");
    assert_eq!(node.short_name, "NO1");
    assert_eq!(node.kind, TransmissionKind::LiveTransmissionFallback);
    assert!(FALLBACK_LAT_RANGE.contains(&node.latitude));
    assert!(FALLBACK_LON_RANGE.contains(&node.longitude));
    // Fallback entries never carry signal metadata.
    assert_eq!(node.snr, None);
    assert_eq!(node.rssi, None);
    assert_eq!(node.time, None);
}

#[test]
fn unusable_message_leaves_registry_untouched() {
    let (coordinator, registry) = setup();
    // An id without a name pair is not enough for the fallback path.
    coordinator.handle_message(TOPIC, b"lowercase chatter !deadbeef");
    coordinator.handle_message(TOPIC, &[0xff, 0x00, 0x80, 0x13, 0x37]);
    coordinator.handle_message(TOPIC, b"");

    assert!(registry.snapshot().is_empty());
}

#[test]
fn no_fix_coordinates_fall_through_to_text_fallback() {
    let (coordinator, registry) = setup();
    // 0/0 means "no fix": the binary strategy must decline, and the name
    // pair and id in the envelope's text framing carry the fallback.
    let mut envelope = ServiceEnvelope::decode(
        position_message(0xCAFEF00D, 0, 0).as_slice(),
    )
    .unwrap();
    envelope.channel_id = "RELAY-FOUR RL4".to_string();
    envelope.gateway_id = "!cafef00d".to_string();
    coordinator.handle_message(TOPIC, &envelope.encode_to_vec());

    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.id, "cafef00d");
    assert_eq!(node.name, "RELAY-FOUR");
    assert_eq!(node.kind, TransmissionKind::LiveTransmissionFallback);
}

#[test]
fn repeated_message_is_idempotent() {
    let (coordinator, registry) = setup();
    let raw = position_message(0x1A2B3C4D, 377_749_000, -1_224_194_000);
    coordinator.handle_message(TOPIC, &raw);
    let first = registry.snapshot().remove(0);

    coordinator.handle_message(TOPIC, &raw);
    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].timestamp >= first.timestamp);
}

#[test]
fn later_message_overwrites_with_no_merge() {
    let (coordinator, registry) = setup();
    coordinator.handle_message(TOPIC, &position_message(0xDEADBEEF, 377_749_000, -1_224_194_000));
    // Same node heard again through the text path: last write wins, synthetic
    // coordinates and all. The type field carries the confidence downgrade.
    coordinator.handle_message(TOPIC, b"NODE-ONE NO1 !deadbeef");

    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.id, "deadbeef");
    assert_eq!(node.kind, TransmissionKind::LiveTransmissionFallback);
    assert!(FALLBACK_LAT_RANGE.contains(&node.latitude));
    assert_eq!(node.snr, None);
}

#[test]
fn binary_entry_takes_metadata_from_text_framing() {
    let (coordinator, registry) = setup();
    let mut envelope = ServiceEnvelope::decode(
        position_message(0x1A2B3C4D, 377_749_000, -1_224_194_000).as_slice(),
    )
    .unwrap();
    // Firmware and names ride alongside the binary payload.
    envelope.channel_id = "BASE-ONE BS1 2.3.2.abcdef".to_string();
    coordinator.handle_message(TOPIC, &envelope.encode_to_vec());

    let nodes = registry.snapshot();
    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.kind, TransmissionKind::LiveTransmission);
    assert_eq!(node.name, "BASE-ONE");
    assert_eq!(node.short_name, "BS1");
    assert_eq!(node.firmware, "2.3.2.abcdef");
}
