//! meshmap-nt library interface
//!
//! Exposes the router and application state so integration tests can drive
//! the HTTP surface directly.

pub mod api;
pub mod decode;
pub mod ingest;
pub mod registry;
pub mod services;

use axum::Router;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::registry::LiveNodeRegistry;
use crate::services::inventory::InventoryClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Live node registry, shared with the subscriber task
    pub registry: Arc<LiveNodeRegistry>,
    /// Best-effort external inventory client
    pub inventory: Arc<InventoryClient>,
    /// Broker connection flag, written by the subscriber task
    pub mqtt_connected: Arc<AtomicBool>,
    /// Service startup timestamp for uptime tracking
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        registry: Arc<LiveNodeRegistry>,
        inventory: InventoryClient,
        mqtt_connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            registry,
            inventory: Arc::new(inventory),
            mqtt_connected,
            started_at: Utc::now(),
        }
    }
}

/// Build application router
///
/// API routes plus permissive CORS and the static frontend, with an
/// index.html fallback for client-side routing.
pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    let frontend = ServeDir::new(public_dir)
        .not_found_service(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .merge(api::health_routes())
        .merge(api::node_routes())
        .fallback_service(frontend)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
