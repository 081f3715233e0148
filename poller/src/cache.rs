//! Last-known player counts, shared between the poll scheduler and readers.

use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe map from server name to the most recent online count.
///
/// Cloning is cheap and yields a handle to the same underlying map, so the
/// scheduler (the writer) and the placeholder engine (the readers) share one
/// cache without any ambient global state. Reads are non-blocking and safe
/// from any thread; per-key updates are atomic, last write wins.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    counts: Arc<DashMap<String, u32>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known count for `name`. Names that have never been probed
    /// successfully read as 0.
    pub fn get(&self, name: &str) -> u32 {
        self.counts.get(name).map(|entry| *entry).unwrap_or(0)
    }

    /// Record a fresh count for `name`, overwriting any previous value.
    pub fn set(&self, name: &str, count: u32) {
        self.counts.insert(name.to_string(), count);
    }

    /// Record a failed probe. The last successful count is retained; a name
    /// with no successful probe yet is pinned at the default 0.
    pub fn mark_failed(&self, name: &str) {
        self.counts.entry(name.to_string()).or_insert(0);
    }

    /// Number of servers with a recorded entry.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
