//! Live node registry
//!
//! One entry per node id, last-write-wins. Staleness is enforced lazily: the
//! sweep runs inside `snapshot()`, the only read path, so an idle registry
//! with no readers may transiently hold expired entries until the next poll
//! arrives. There is no background eviction timer and no explicit delete.

use chrono::{Duration, Utc};
use meshmap_common::model::LiveNode;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Entries older than this are expired and must never be served.
pub const STALE_AFTER_SECS: i64 = 10 * 60;

/// Shared between the subscriber task (writer) and HTTP handlers (readers).
/// One mutex suffices: both operations are brief and O(registry size).
#[derive(Default)]
pub struct LiveNodeRegistry {
    nodes: Mutex<HashMap<String, LiveNode>>,
}

impl LiveNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `node.id`. No field merge: the new
    /// entry replaces the old one wholesale.
    pub fn upsert(&self, node: LiveNode) {
        self.nodes.lock().insert(node.id.clone(), node);
    }

    /// Evict every expired entry, then return what remains, unordered.
    pub fn snapshot(&self) -> Vec<LiveNode> {
        let cutoff = Utc::now() - Duration::seconds(STALE_AFTER_SECS);
        let mut nodes = self.nodes.lock();
        nodes.retain(|_, node| node.timestamp >= cutoff);
        nodes.values().cloned().collect()
    }

    /// Raw entry count for the health report. Not a node read, so it does
    /// not trigger the eviction sweep.
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }
}
