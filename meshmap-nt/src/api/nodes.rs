//! Node listing endpoints
//!
//! Ingestion failures are never visible here: the live listing only reflects
//! what made it into the registry, and the inventory listing always produces
//! a dataset thanks to the aggregator's fixed fallback.

use axum::{extract::State, routing::get, Json, Router};
use meshmap_common::model::{InventoryNode, LiveNode};
use tracing::debug;

use crate::AppState;

/// GET /api/live-nodes
///
/// Registry snapshot: every currently-live node, staleness sweep included.
pub async fn live_nodes(State(state): State<AppState>) -> Json<Vec<LiveNode>> {
    let nodes = state.registry.snapshot();
    debug!(count = nodes.len(), "serving live nodes");
    Json(nodes)
}

/// GET /api/nodes
///
/// Aggregated external inventory, fetched on demand.
pub async fn inventory_nodes(State(state): State<AppState>) -> Json<Vec<InventoryNode>> {
    Json(state.inventory.fetch_nodes().await)
}

/// Build node listing routes
pub fn node_routes() -> Router<AppState> {
    Router::new()
        .route("/api/live-nodes", get(live_nodes))
        .route("/api/nodes", get(inventory_nodes))
}
