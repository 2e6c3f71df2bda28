//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the analysis engine needs from the outside. Both ports are
//! synchronous: the engine is a pure computation and never suspends.

use shared_types::UnixMillis;

/// Download latency bookkeeping, fed by the (external) fetch layer.
///
/// Consumed read-only: percentiles and failure counts land in the report's
/// statistics section and never influence a discrepancy decision.
pub trait DownloadStatistics: Send + Sync {
    /// Authorities with any recorded fetch history, sorted by nickname.
    fn known_authorities(&self) -> Vec<String>;

    /// Latency percentile in milliseconds over the trailing window.
    ///
    /// Supported percentiles are 0, 25, 50, 75 and 100. `None` when the
    /// authority has no samples in the window.
    fn percentile(&self, authority: &str, percentile: u8) -> Option<u64>;

    /// Timeouts and failures over the trailing window.
    fn failure_count(&self, authority: &str) -> u64;
}

/// Time source for staleness and expiry checks.
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in milliseconds.
    fn now_millis(&self) -> UnixMillis;
}

/// Default time source using system time.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> UnixMillis {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
