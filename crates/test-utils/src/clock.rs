use autobackup::session::Clock;
use tokio::time::{Duration, Instant};

/// Clock whose Unix seconds advance with tokio's (possibly paused) clock.
///
/// `unix_seconds()` is `unix_base` plus whole seconds elapsed since the clock
/// was created, so with `start_paused = true` a test that advances time by
/// 7s sees snapshot directories named `unix_base + 7`.
#[derive(Debug, Clone, Copy)]
pub struct PausedClock {
    start: Instant,
    unix_base: u64,
}

impl PausedClock {
    pub fn new(unix_base: u64) -> Self {
        Self {
            start: Instant::now(),
            unix_base,
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now() - self.start
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_seconds(&self) -> u64 {
        self.unix_base + self.elapsed().as_secs()
    }
}
