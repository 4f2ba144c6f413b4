// src/dispatcher.rs

//! Starts one watcher per configured session.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::ConfigFile;
use crate::errors::{BackupError, Result};
use crate::session::{Clock, Session, SessionHandler, SystemClock, DEFAULT_SETTLE_DELAY};
use crate::snapshot::SnapshotWriter;
use crate::types::StartupPolicy;
use crate::watch::{start_session_watcher, WatcherHandle};

/// Owns all sessions until they are started.
///
/// Sessions are handed to their watchers by value, so after [`start`]
/// each one is owned by exactly one worker task.
///
/// [`start`]: Dispatcher::start
#[derive(Debug)]
pub struct Dispatcher {
    sessions: Vec<Session>,
    policy: StartupPolicy,
    launch_time: Instant,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
    writer_override: Option<Arc<dyn SnapshotWriter>>,
}

impl Dispatcher {
    pub fn new(sessions: Vec<Session>, policy: StartupPolicy, launch_time: Instant) -> Self {
        Self {
            sessions,
            policy,
            launch_time,
            clock: Arc::new(SystemClock),
            settle_delay: DEFAULT_SETTLE_DELAY,
            writer_override: None,
        }
    }

    pub fn from_config(cfg: &ConfigFile, policy: StartupPolicy, launch_time: Instant) -> Self {
        let sessions = cfg
            .sessions()
            .iter()
            .map(|(name, session)| Session::from_config(name.clone(), session))
            .collect();
        Self::new(sessions, policy, launch_time)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Use `writer` for every session instead of the per-format default.
    pub fn with_writer(mut self, writer: Arc<dyn SnapshotWriter>) -> Self {
        self.writer_override = Some(writer);
        self
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Start a watcher for every session.
    ///
    /// With [`StartupPolicy::FailFast`] the first failure is returned (the
    /// error names the session) and watchers started so far are dropped.
    /// With [`StartupPolicy::KeepGoing`] failures are logged and skipped; it
    /// is still an error if no session could be started.
    pub fn start(self) -> Result<Vec<WatcherHandle>> {
        let mut handles = Vec::with_capacity(self.sessions.len());
        let mut failed = 0usize;

        for session in self.sessions {
            let name = session.name.clone();
            let mut handler = SessionHandler::new(session, self.launch_time)
                .with_clock(Arc::clone(&self.clock))
                .with_settle_delay(self.settle_delay);
            if let Some(writer) = &self.writer_override {
                handler = handler.with_writer(Arc::clone(writer));
            }

            match start_session_watcher(handler) {
                Ok(handle) => handles.push(handle),
                Err(err) => match self.policy {
                    StartupPolicy::FailFast => {
                        error!(session = %name, error = %err, "failed to start session");
                        return Err(err);
                    }
                    StartupPolicy::KeepGoing => {
                        warn!(session = %name, error = %err, "failed to start session; continuing without it");
                        failed += 1;
                    }
                },
            }
        }

        if handles.is_empty() && failed > 0 {
            return Err(BackupError::NoSessionsStarted { failed });
        }

        info!(started = handles.len(), failed, "sessions started");
        Ok(handles)
    }
}
