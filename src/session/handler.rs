// src/session/handler.rs

//! Per-session change handling: debounce, settle, snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::session::clock::{Clock, SystemClock};
use crate::session::debounce::{DebounceDecision, DebounceState};
use crate::session::Session;
use crate::snapshot::{base_name, writer_for, SnapshotRequest, SnapshotTarget, SnapshotWriter};
use crate::watch::ChangeEvent;

/// Pause between accepting a trigger and starting the snapshot, giving the
/// program that caused the change a chance to finish writing.
///
/// This lowers the chance of copying a half-written file; it does not rule it
/// out.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// What happened to one change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Too soon after the previous backup.
    Suppressed,
    /// Snapshot written at this path.
    Written(PathBuf),
    /// Snapshot attempted but failed (already logged).
    Failed,
}

/// Owns one session and its debounce state.
///
/// A handler is driven by exactly one worker task, which is what makes the
/// unsynchronized `last_backup_at` inside [`DebounceState`] sound.
#[derive(Debug)]
pub struct SessionHandler {
    session: Session,
    debounce: DebounceState,
    writer: Arc<dyn SnapshotWriter>,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
}

impl SessionHandler {
    /// Handler with the production writer for the session's format, the
    /// system clock and the default settle delay.
    pub fn new(session: Session, launch_time: Instant) -> Self {
        let writer = writer_for(session.snapshot_format());
        let debounce = DebounceState::new(launch_time, session.minimum_interval);
        Self {
            session,
            debounce,
            writer,
            clock: Arc::new(SystemClock),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn SnapshotWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn debounce(&self) -> &DebounceState {
        &self.debounce
    }

    /// Current instant according to the handler's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Handle a change that already passed the session's name filter.
    ///
    /// `observed_at` is when the notification was delivered; the debounce
    /// rule is applied to that instant, not to when the worker got to it.
    /// The debounce state is updated before the settle delay and the write.
    pub async fn on_change(&mut self, event: &ChangeEvent, observed_at: Instant) -> HandleOutcome {
        let subject = self.subject_path(event);

        match self.debounce.check(observed_at) {
            DebounceDecision::Suppressed { since_last } => {
                info!(
                    session = %self.session.name,
                    path = ?subject,
                    ?since_last,
                    minimum_interval = ?self.session.minimum_interval,
                    "changed again but less than minimum interval; skipping backup"
                );
                return HandleOutcome::Suppressed;
            }
            DebounceDecision::Accepted { since_last } => {
                info!(
                    session = %self.session.name,
                    path = ?subject,
                    kind = ?event.kind,
                    format = %self.session.snapshot_format(),
                    ?since_last,
                    "changed; backing up"
                );
            }
        }

        let request = match self.build_request(event, self.clock.unix_seconds()) {
            Some(r) => r,
            None => {
                error!(
                    session = %self.session.name,
                    path = ?subject,
                    "cannot name snapshot for path without a file name"
                );
                return HandleOutcome::Failed;
            }
        };

        if !self.settle_delay.is_zero() {
            debug!(session = %self.session.name, delay = ?self.settle_delay, "waiting for writes to settle");
            tokio::time::sleep(self.settle_delay).await;
        }

        self.write_snapshot(request).await
    }

    /// Build the snapshot request for `event` at `unix_seconds`.
    ///
    /// Whole-directory mode snapshots the session directory; file-filtered
    /// mode snapshots only the changed file.
    pub fn build_request(&self, event: &ChangeEvent, unix_seconds: u64) -> Option<SnapshotRequest> {
        let source = self.subject_path(event);
        let name = base_name(&source)?;
        let target = SnapshotTarget::new(
            &self.session.destination,
            unix_seconds,
            name,
            self.session.snapshot_format(),
        );
        Some(SnapshotRequest {
            session: self.session.name.clone(),
            sources: vec![source],
            target,
        })
    }

    fn subject_path(&self, event: &ChangeEvent) -> PathBuf {
        if self.session.is_whole_directory() {
            self.session.directory.clone()
        } else {
            event.path.clone()
        }
    }

    async fn write_snapshot(&self, request: SnapshotRequest) -> HandleOutcome {
        let writer = Arc::clone(&self.writer);
        let session = self.session.name.clone();
        let dest = request.target.path();
        let sources = request.sources.clone();

        match tokio::task::spawn_blocking(move || writer.write(&request)).await {
            Ok(Ok(path)) => {
                info!(session = %session, dest = ?path, "backup written");
                HandleOutcome::Written(path)
            }
            Ok(Err(err)) => {
                error!(
                    session = %session,
                    src = ?sources,
                    dest = ?dest,
                    error = %err,
                    "backup failed"
                );
                HandleOutcome::Failed
            }
            Err(join_err) => {
                error!(session = %session, dest = ?dest, error = %join_err, "backup task panicked");
                HandleOutcome::Failed
            }
        }
    }
}
