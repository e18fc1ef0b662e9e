//! External node inventory aggregation
//!
//! Queries an ordered list of community inventory endpoints, normalizes their
//! heterogeneous response shapes into [`InventoryNode`] records, and falls
//! back to a fixed placeholder dataset when every source fails. Stateless per
//! call; entirely independent of the live ingestion path.

use meshmap_common::config::InventoryConfig;
use meshmap_common::model::InventoryNode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const USER_AGENT: &str = "Multiverse-MeshMap/1.0";

/// Inventory coordinates are fixed-point, scaled by 1e7 like the live feed.
const COORD_SCALE: f64 = 10_000_000.0;

/// Per-source failures. Never surfaced past [`InventoryClient::fetch_nodes`];
/// the caller always gets a dataset.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Source returned status {0}")]
    Status(u16),

    #[error("Unexpected response shape")]
    Shape,
}

/// Best-effort inventory client over the configured source list.
pub struct InventoryClient {
    http: reqwest::Client,
    sources: Vec<String>,
}

impl InventoryClient {
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InventoryError::Network(e.to_string()))?;

        Ok(Self {
            http,
            sources: config.sources.clone(),
        })
    }

    /// Fetch, normalize, and filter the first source that yields any valid
    /// nodes. Sources are tried strictly in order; a failure or an empty
    /// result moves on to the next. When everything fails the fixed
    /// placeholder dataset is returned, so this never errors and never
    /// returns an empty list.
    pub async fn fetch_nodes(&self) -> Vec<InventoryNode> {
        for url in &self.sources {
            match self.fetch_source(url).await {
                Ok(nodes) if !nodes.is_empty() => {
                    info!(url = %url, count = nodes.len(), "inventory source succeeded");
                    return nodes;
                }
                Ok(_) => {
                    warn!(url = %url, "inventory source returned no valid nodes");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "inventory source failed");
                }
            }
        }

        warn!("all inventory sources failed, serving placeholder dataset");
        fallback_nodes()
    }

    async fn fetch_source(&self, url: &str) -> Result<Vec<InventoryNode>, InventoryError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| InventoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::Status(status.as_u16()));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| InventoryError::Network(e.to_string()))?;

        normalize_response(&value).ok_or(InventoryError::Shape)
    }
}

/// Accepts either an array of node records or an object keyed by node id
/// (values taken). Anything else is an unusable shape.
pub fn normalize_response(value: &Value) -> Option<Vec<InventoryNode>> {
    let rows: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return None,
    };

    Some(rows.into_iter().filter_map(normalize_entry).collect())
}

/// Normalize one record across the field-name variants the known sources
/// use. Records without plausible coordinates are dropped.
fn normalize_entry(entry: &Value) -> Option<InventoryNode> {
    let latitude =
        coordinate_field(entry, &["latitude", "lat"], &["lat", "latitude"])? / COORD_SCALE;
    let longitude =
        coordinate_field(entry, &["longitude", "lng", "lon"], &["lng", "longitude"])? / COORD_SCALE;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(InventoryNode {
        id: string_field(entry, &["id", "node_id", "hex_id"]),
        name: string_field(
            entry,
            &["name", "longName", "long_name", "shortName", "short_name"],
        ),
        latitude,
        longitude,
        hardware: string_field(entry, &["hardware", "hwModel", "hw_model"]),
        last_seen: string_field(entry, &["last_seen", "lastSeen", "updated_at"]),
    })
}

/// First present top-level key, then the nested `position` object.
/// Sources emit coordinates as JSON numbers or numeric strings.
fn coordinate_field(entry: &Value, keys: &[&str], position_keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = entry.get(key).and_then(numeric) {
            return Some(v);
        }
    }
    let position = entry.get("position")?;
    position_keys
        .iter()
        .find_map(|key| position.get(key).and_then(numeric))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| entry.get(key))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Fixed dataset served when every source fails: enough to keep the map
/// rendering something instead of erroring out.
pub fn fallback_nodes() -> Vec<InventoryNode> {
    let placeholder = |id: &str, name: &str, latitude: f64, longitude: f64| InventoryNode {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        latitude,
        longitude,
        hardware: Some("Test Hardware".to_string()),
        last_seen: None,
    };

    vec![
        placeholder("test1", "Test Node NYC", 40.7128, -74.0060),
        placeholder("test2", "Test Node LA", 34.0522, -118.2437),
        placeholder("test3", "Test Node Chicago", 41.8781, -87.6298),
        placeholder("test4", "Test Node Houston", 29.7604, -95.3698),
        placeholder("test5", "Test Node Philadelphia", 39.9526, -75.1652),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_keyed_object_response() {
        let value = json!({"a": {"lat": 407128000, "lng": -740060000}});
        let nodes = normalize_response(&value).unwrap();

        assert_eq!(nodes.len(), 1);
        assert!((nodes[0].latitude - 40.7128).abs() < 1e-9);
        assert!((nodes[0].longitude - -74.0060).abs() < 1e-9);
        assert_eq!(nodes[0].id, None);
    }

    #[test]
    fn normalizes_array_with_nested_position() {
        let value = json!([{
            "node_id": "3f2a1b0c",
            "long_name": "Ridge Repeater",
            "position": {"latitude": 451234567, "longitude": -1229876543},
            "hw_model": "TBEAM",
            "updated_at": "2025-08-01T12:00:00Z"
        }]);
        let nodes = normalize_response(&value).unwrap();

        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.id.as_deref(), Some("3f2a1b0c"));
        assert_eq!(node.name.as_deref(), Some("Ridge Repeater"));
        assert!((node.latitude - 45.1234567).abs() < 1e-9);
        assert_eq!(node.hardware.as_deref(), Some("TBEAM"));
        assert_eq!(node.last_seen.as_deref(), Some("2025-08-01T12:00:00Z"));
    }

    #[test]
    fn accepts_numeric_strings() {
        let value = json!([{"id": "x", "lat": "377749000", "lon": "-1224194000"}]);
        let nodes = normalize_response(&value).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!((nodes[0].latitude - 37.7749).abs() < 1e-9);
    }

    #[test]
    fn drops_entries_without_plausible_coordinates() {
        let value = json!([
            {"id": "bad1", "lat": 950000000, "lng": 0},
            {"id": "bad2", "name": "no coords at all"},
            {"id": "bad3", "lat": "not a number", "lng": "-740060000"},
            {"id": "good", "lat": 407128000, "lng": -740060000},
        ]);
        let nodes = normalize_response(&value).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id.as_deref(), Some("good"));
    }

    #[test]
    fn scalar_response_is_an_unusable_shape() {
        assert!(normalize_response(&json!("nope")).is_none());
        assert!(normalize_response(&json!(42)).is_none());
        assert!(normalize_response(&Value::Null).is_none());
    }

    #[test]
    fn fallback_dataset_is_fixed_and_valid() {
        let nodes = fallback_nodes();
        assert_eq!(nodes.len(), 5);
        assert!(nodes
            .iter()
            .all(|n| (-90.0..=90.0).contains(&n.latitude)
                && (-180.0..=180.0).contains(&n.longitude)));
        assert_eq!(nodes[0].name.as_deref(), Some("Test Node NYC"));
    }

    #[tokio::test]
    async fn empty_source_list_serves_fallback() {
        let client = InventoryClient::new(&InventoryConfig {
            sources: vec![],
            timeout_secs: 1,
        })
        .unwrap();
        let nodes = client.fetch_nodes().await;
        assert_eq!(nodes.len(), 5);
    }
}
