//! # In-Memory Download Statistics
//!
//! Adapter backing the `DownloadStatistics` port with raw samples held in
//! memory. The fetch layer records one latency sample per completed request
//! and one failure mark per timeout; reads serve nearest-rank percentiles
//! over a trailing window.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use shared_types::UnixMillis;

use crate::ports::outbound::DownloadStatistics;

const DEFAULT_WINDOW_MILLIS: u64 = 7 * 24 * 60 * 60 * 1_000;

#[derive(Clone, Debug, Default)]
struct AuthorityHistory {
    /// (recorded_at, latency) pairs inside the window.
    samples: Vec<(UnixMillis, u64)>,
    /// Failure timestamps inside the window.
    failures: Vec<UnixMillis>,
}

impl AuthorityHistory {
    fn newest(&self) -> Option<UnixMillis> {
        self.samples
            .iter()
            .map(|(at, _)| *at)
            .chain(self.failures.iter().copied())
            .max()
    }

    fn prune(&mut self, cutoff: UnixMillis) {
        self.samples.retain(|(at, _)| *at >= cutoff);
        self.failures.retain(|at| *at >= cutoff);
    }
}

/// Thread-safe sample store with a trailing retention window.
///
/// The window trails each authority's newest record, not the wall clock, so
/// replaying historical samples in tests behaves the same as live recording.
pub struct InMemoryDownloadStatistics {
    window_millis: u64,
    history: RwLock<BTreeMap<String, AuthorityHistory>>,
}

impl InMemoryDownloadStatistics {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_MILLIS)
    }

    pub fn with_window(window_millis: u64) -> Self {
        Self {
            window_millis,
            history: RwLock::new(BTreeMap::new()),
        }
    }

    /// Record one completed request's latency.
    pub fn record_success(&self, authority: &str, recorded_at: UnixMillis, latency_millis: u64) {
        let mut history = self.history.write();
        let entry = history.entry(authority.to_string()).or_default();
        entry.samples.push((recorded_at, latency_millis));
        let newest = entry.newest().unwrap_or(recorded_at);
        entry.prune(newest.saturating_sub(self.window_millis));
    }

    /// Record one request that timed out or failed.
    pub fn record_failure(&self, authority: &str, recorded_at: UnixMillis) {
        let mut history = self.history.write();
        let entry = history.entry(authority.to_string()).or_default();
        entry.failures.push(recorded_at);
        let newest = entry.newest().unwrap_or(recorded_at);
        entry.prune(newest.saturating_sub(self.window_millis));
    }
}

impl Default for InMemoryDownloadStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadStatistics for InMemoryDownloadStatistics {
    fn known_authorities(&self) -> Vec<String> {
        self.history.read().keys().cloned().collect()
    }

    fn percentile(&self, authority: &str, percentile: u8) -> Option<u64> {
        if percentile > 100 {
            return None;
        }
        let history = self.history.read();
        let entry = history.get(authority)?;
        if entry.samples.is_empty() {
            return None;
        }

        let mut latencies: Vec<u64> = entry.samples.iter().map(|(_, latency)| *latency).collect();
        latencies.sort_unstable();

        // Nearest rank: rank n means the n-th smallest, rank 0 clamps to the
        // minimum.
        let rank = (usize::from(percentile) * latencies.len()).div_ceil(100);
        latencies.get(rank.saturating_sub(1)).copied()
    }

    fn failure_count(&self, authority: &str) -> u64 {
        self.history
            .read()
            .get(authority)
            .map(|entry| entry.failures.len() as u64)
            .unwrap_or(0)
    }
}
