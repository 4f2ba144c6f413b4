// src/session/debounce.rs

use std::time::Duration;

use tokio::time::Instant;

/// Decide whether a change observed at `now` should trigger a backup.
///
/// A trigger is suppressed only if less than `minimum_interval` has passed
/// since `last_backup_at` **and** a backup has already happened this run.
/// `last_backup_at == launch_time` means no backup yet, so the first change
/// is always honored. Exactly `minimum_interval` elapsed is accepted.
pub fn should_trigger(
    now: Instant,
    last_backup_at: Instant,
    launch_time: Instant,
    minimum_interval: Duration,
) -> bool {
    let too_soon = now.saturating_duration_since(last_backup_at) < minimum_interval;
    !(too_soon && last_backup_at != launch_time)
}

/// Outcome of [`DebounceState::check`], carrying the time since the previous
/// backup for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    Accepted { since_last: Duration },
    Suppressed { since_last: Duration },
}

impl DebounceDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DebounceDecision::Accepted { .. })
    }
}

/// Debounce bookkeeping for one session.
///
/// Owned by the session's single worker; `last_backup_at` starts at the
/// process launch time and moves forward on every accepted trigger.
#[derive(Debug, Clone)]
pub struct DebounceState {
    launch_time: Instant,
    last_backup_at: Instant,
    minimum_interval: Duration,
}

impl DebounceState {
    pub fn new(launch_time: Instant, minimum_interval: Duration) -> Self {
        Self {
            launch_time,
            last_backup_at: launch_time,
            minimum_interval,
        }
    }

    pub fn last_backup_at(&self) -> Instant {
        self.last_backup_at
    }

    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// True until the first trigger has been accepted.
    pub fn is_pristine(&self) -> bool {
        self.last_backup_at == self.launch_time
    }

    /// Apply the rule at `now`. On acceptance `last_backup_at` is advanced
    /// to `now` before returning, i.e. before any snapshot work starts.
    pub fn check(&mut self, now: Instant) -> DebounceDecision {
        let since_last = now.saturating_duration_since(self.last_backup_at);
        if should_trigger(now, self.last_backup_at, self.launch_time, self.minimum_interval) {
            self.last_backup_at = now;
            DebounceDecision::Accepted { since_last }
        } else {
            DebounceDecision::Suppressed { since_last }
        }
    }
}
