//! # Fixed Time Source
//!
//! Deterministic clock for tests and replayed runs.

use shared_types::UnixMillis;

use crate::ports::outbound::TimeSource;

/// A clock pinned to one instant.
pub struct FixedTimeSource {
    now: UnixMillis,
}

impl FixedTimeSource {
    pub fn new(now: UnixMillis) -> Self {
        Self { now }
    }
}

impl TimeSource for FixedTimeSource {
    fn now_millis(&self) -> UnixMillis {
        self.now
    }
}
