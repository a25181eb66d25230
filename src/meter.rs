//! Traffic metering sinks
//!
//! A session reports its final `(sent, recv)` totals exactly once, at close,
//! keyed by its credential identifier. Sinks are shared across sessions and
//! must tolerate concurrent updates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Sink for per-credential traffic totals
#[async_trait]
pub trait TrafficMeter: Send + Sync {
    /// Record one finished session's totals under `key`
    async fn count(&self, key: &str, sent: u64, recv: u64);
}

/// Meter that discards everything; the default for new sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTrafficMeter;

#[async_trait]
impl TrafficMeter for EmptyTrafficMeter {
    async fn count(&self, _key: &str, _sent: u64, _recv: u64) {}
}

/// Accumulated usage for one credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficStats {
    pub sent: u64,
    pub recv: u64,
    /// Number of sessions that reported under this key
    pub sessions: u64,
}

/// In-memory meter for development and testing
///
/// Sums totals per key. Updates are serialized by an internal lock.
#[derive(Debug, Default, Clone)]
pub struct MemoryTrafficMeter {
    stats: Arc<RwLock<HashMap<String, TrafficStats>>>,
}

impl MemoryTrafficMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals recorded under `key`, if any
    pub async fn get(&self, key: &str) -> Option<TrafficStats> {
        self.stats.read().await.get(key).copied()
    }

    /// Copy of all recorded totals
    pub async fn snapshot(&self) -> HashMap<String, TrafficStats> {
        self.stats.read().await.clone()
    }
}

#[async_trait]
impl TrafficMeter for MemoryTrafficMeter {
    async fn count(&self, key: &str, sent: u64, recv: u64) {
        let mut stats = self.stats.write().await;
        let entry = stats.entry(key.to_string()).or_default();
        entry.sent = entry.sent.saturating_add(sent);
        entry.recv = entry.recv.saturating_add(recv);
        entry.sessions += 1;
    }
}

/// Format a byte count for logs, e.g. `512 B`, `1.50 KiB`, `2.00 GiB`
pub fn human_friendly_traffic(bytes: u64) -> String {
    if bytes <= KIB {
        format!("{} B", bytes)
    } else if bytes <= MIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else if bytes <= GIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    }
}
