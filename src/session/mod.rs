// src/session/mod.rs

//! Per-session state and decision logic.
//!
//! A [`Session`] is one configured watch-and-backup unit. Each session gets
//! its own [`SessionHandler`] which owns the session's `last_backup_at` and
//! is driven by exactly one worker task, so no locking is involved.
//!
//! - [`debounce`] is the pure trigger/suppress rule.
//! - [`handler`] applies it to accepted change events and runs snapshots.
//! - [`clock`] abstracts "now" so timing can be driven from tests.

pub mod clock;
pub mod debounce;
pub mod handler;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::SessionConfig;
use crate::types::{SessionName, SnapshotFormat};

pub use clock::{Clock, SystemClock};
pub use debounce::{should_trigger, DebounceDecision, DebounceState};
pub use handler::{HandleOutcome, SessionHandler, DEFAULT_SETTLE_DELAY};

/// One configured watch-and-backup unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: SessionName,
    /// Absolute path of the watched root.
    pub directory: PathBuf,
    /// Basenames to react to; empty means the whole subtree.
    pub file_filter: BTreeSet<String>,
    /// Root under which timestamped backups are written.
    pub destination: PathBuf,
    pub compress: bool,
    pub minimum_interval: Duration,
}

impl Session {
    pub fn from_config(name: impl Into<SessionName>, cfg: &SessionConfig) -> Self {
        Self {
            name: name.into(),
            directory: cfg.dir.clone(),
            file_filter: cfg.files.clone(),
            destination: cfg.copy_to.clone(),
            compress: cfg.compression,
            minimum_interval: cfg.minimum_interval,
        }
    }

    /// True when no file filter is configured.
    pub fn is_whole_directory(&self) -> bool {
        self.file_filter.is_empty()
    }

    pub fn snapshot_format(&self) -> SnapshotFormat {
        SnapshotFormat::from_compress(self.compress)
    }

    /// Name filter: accept everything in whole-directory mode, otherwise only
    /// paths whose basename is in the filter.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.is_whole_directory() {
            return true;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.file_filter.contains(name),
            None => false,
        }
    }
}
