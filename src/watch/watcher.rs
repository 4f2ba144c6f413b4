// src/watch/watcher.rs

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use crate::errors::{BackupError, Result};
use crate::session::{HandleOutcome, SessionHandler};
use crate::types::SessionName;
use crate::watch::event::ChangeEvent;

/// Message coming out of the notify callback: an event or a stream error,
/// stamped with the instant it was delivered.
#[derive(Debug)]
pub struct WatchMessage {
    pub received_at: Instant,
    pub payload: notify::Result<Event>,
}

impl WatchMessage {
    /// Stamp `payload` with the current instant.
    pub fn new(payload: notify::Result<Event>) -> Self {
        Self::at(Instant::now(), payload)
    }

    pub fn at(received_at: Instant, payload: notify::Result<Event>) -> Self {
        Self {
            received_at,
            payload,
        }
    }
}

/// Handle for one session's filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching for the session.
pub struct WatcherHandle {
    session: SessionName,
    _inner: RecommendedWatcher,
    worker: JoinHandle<SessionExit>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    pub fn session(&self) -> &str {
        &self.session
    }

    /// True once the session's worker has stopped (e.g. after a stream error).
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Why a session worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The notification channel closed.
    Closed,
    /// The notification source reported an error.
    StreamError,
}

/// Subscribe to changes under the handler's session directory and spawn the
/// session's worker task.
///
/// The subscription is established before this returns: if it cannot be set
/// up, a [`BackupError::SessionSetup`] is returned and nothing is spawned.
/// Must be called from within a tokio runtime.
pub fn start_session_watcher(handler: SessionHandler) -> Result<WatcherHandle> {
    let session = handler.session().name.clone();
    let dir = handler.session().directory.clone();

    // Whole-directory sessions care about the entire subtree; filtered
    // sessions only about files directly inside the directory.
    let mode = if handler.session().is_whole_directory() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    let setup_err = |source: notify::Error| BackupError::SessionSetup {
        session: session.clone(),
        dir: dir.clone(),
        source,
    };

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WatchMessage>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver only goes away once the worker has stopped.
            let _ = event_tx.send(WatchMessage::new(res));
        },
        Config::default(),
    )
    .map_err(setup_err)?;

    watcher.watch(&dir, mode).map_err(setup_err)?;

    info!(session = %session, dir = ?dir, ?mode, "file watcher started");

    let worker = tokio::spawn(run_session_loop(event_rx, handler));

    Ok(WatcherHandle {
        session,
        _inner: watcher,
        worker,
    })
}

/// The per-session worker loop.
///
/// Events are handled one at a time in delivery order: filter by name, then
/// hand to the session handler (debounce, settle, snapshot), debounced on
/// their delivery instant. Events delivered while a snapshot was being taken
/// are dropped rather than replayed once the worker is free. A notify error
/// ends the loop for good.
pub async fn run_session_loop(
    mut event_rx: mpsc::UnboundedReceiver<WatchMessage>,
    mut handler: SessionHandler,
) -> SessionExit {
    let session = handler.session().name.clone();
    // End of the most recent snapshot attempt.
    let mut busy_until: Option<Instant> = None;

    while let Some(message) = event_rx.recv().await {
        let received_at = message.received_at;
        let event = match message.payload {
            Ok(event) => event,
            Err(err) => {
                error!(
                    session = %session,
                    error = %err,
                    "file watch error; session stops watching"
                );
                return SessionExit::StreamError;
            }
        };

        trace!(session = %session, ?event, "received notify event");

        for change in ChangeEvent::from_notify(event) {
            if !handler.session().accepts(&change.path) {
                trace!(session = %session, path = ?change.path, "path not in file filter");
                continue;
            }

            if busy_until.is_some_and(|until| received_at < until) {
                debug!(
                    session = %session,
                    path = ?change.path,
                    "changed while a backup was in progress; dropped"
                );
                continue;
            }

            let outcome = handler.on_change(&change, received_at).await;
            debug!(session = %session, path = ?change.path, ?outcome, "change handled");
            if outcome != HandleOutcome::Suppressed {
                busy_until = Some(handler.now());
            }
        }
    }

    debug!(session = %session, "session watcher loop ended");
    SessionExit::Closed
}
