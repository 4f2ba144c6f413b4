// src/session/clock.rs

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Source of the two notions of time a session needs: a monotonic instant
/// for debouncing and wall-clock Unix seconds for naming snapshots.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
    fn unix_seconds(&self) -> u64;
}

/// Production clock.
///
/// `now()` goes through tokio so paused-time tests see consistent instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
