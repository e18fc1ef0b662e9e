//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::Ordering;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status (always "ok" when the process is serving)
    pub status: String,
    /// Service name ("meshmap-nt")
    pub service: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Current wall-clock time, RFC3339
    pub timestamp: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether the broker subscription is currently up
    pub mqtt_connected: bool,
    /// Raw registry entry count (stale entries included until the next poll)
    pub live_nodes: usize,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.started_at);

    Json(HealthResponse {
        status: "ok".to_string(),
        service: "meshmap-nt".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        mqtt_connected: state.mqtt_connected.load(Ordering::Relaxed),
        live_nodes: state.registry.len(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
