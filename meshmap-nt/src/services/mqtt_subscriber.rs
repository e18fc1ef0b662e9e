//! Transport subscriber
//!
//! Maintains the persistent broker connection, subscribes to the configured
//! topic filter, and hands every publish to the ingestion coordinator.
//! Reconnection is the transport library's concern; this loop logs faults,
//! flips the connection flag for the health report, and keeps polling.

use meshmap_common::config::MqttConfig;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ingest::IngestCoordinator;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run the subscriber until the process exits. Spawned as a background task.
pub async fn run(config: MqttConfig, coordinator: IngestCoordinator, connected: Arc<AtomicBool>) {
    let client_id = format!("{}_{}", config.client_id_prefix, std::process::id());
    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_credentials(config.username.clone(), config.password.clone());
    options.set_keep_alive(KEEP_ALIVE);

    let (client, mut event_loop) = AsyncClient::new(options, 64);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::Relaxed);
                info!(broker = %config.host, topic = %config.topic, "connected to MQTT broker");
                // Subscribe on every ConnAck so the subscription survives
                // broker-side session loss across reconnects.
                if let Err(e) = client.subscribe(config.topic.clone(), QoS::AtMostOnce).await {
                    warn!(error = %e, "MQTT subscribe failed");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                coordinator.handle_message(&publish.topic, &publish.payload);
            }
            Ok(_) => {}
            Err(e) => {
                connected.store(false, Ordering::Relaxed);
                warn!(error = %e, "MQTT connection error, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
