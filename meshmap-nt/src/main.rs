//! meshmap-nt - MeshMap Node Tracker
//!
//! Ingests live position beacons from the mesh-radio MQTT feed, keeps a
//! 10-minute registry of transmitting nodes, and serves it over HTTP
//! alongside aggregated inventory data and a static map frontend.

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use meshmap_common::config::{Args, Config};
use meshmap_nt::ingest::IngestCoordinator;
use meshmap_nt::registry::LiveNodeRegistry;
use meshmap_nt::services::{inventory::InventoryClient, mqtt_subscriber};
use meshmap_nt::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(&args)?;

    info!("Starting meshmap-nt (node tracker)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(LiveNodeRegistry::new());
    let mqtt_connected = Arc::new(AtomicBool::new(false));
    let inventory = InventoryClient::new(&config.inventory)?;

    // Single writer: the subscriber task owns the ingestion side.
    let coordinator = IngestCoordinator::new(Arc::clone(&registry));
    tokio::spawn(mqtt_subscriber::run(
        config.mqtt.clone(),
        coordinator,
        Arc::clone(&mqtt_connected),
    ));

    let state = AppState::new(Arc::clone(&registry), inventory, mqtt_connected);
    let app = meshmap_nt::build_router(state, &config.http.public_dir);

    let addr = format!("{}:{}", config.http.bind, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("  GET /api/live-nodes - currently transmitting nodes");
    info!("  GET /api/nodes - aggregated node inventory");
    info!("  GET /api/health - health check");
    info!("  Static files served from {}", config.http.public_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}
