// src/config/model.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::SessionName;

/// Top-level configuration as read from a YAML file.
///
/// The file is a mapping from session name to session entry:
///
/// ```yaml
/// notes:
///   dir: /home/me/notes
///   copyTo: /backups/notes
///   minimumInterval: 5m
///
/// game-saves:
///   dir: /home/me/.local/share/game
///   files: [save1.dat, save2.dat]
///   copyTo: /backups/game
///   compression: true
/// ```
///
/// Use [`ConfigFile::try_from`] (or `load_and_validate`) to turn it into a
/// validated [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(transparent)]
pub struct RawConfigFile {
    pub sessions: BTreeMap<SessionName, RawSessionConfig>,
}

/// One session entry, exactly as written in the YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSessionConfig {
    /// Directory to watch.
    pub dir: String,

    /// File names to restrict matching to. Empty means the whole directory.
    #[serde(default)]
    pub files: Vec<String>,

    /// Root directory under which timestamped backups are written.
    #[serde(rename = "copyTo")]
    pub copy_to: String,

    /// Produce a `.tar.gz` archive instead of a plain copy.
    #[serde(default)]
    pub compression: bool,

    /// Minimum time between two backups of this session.
    #[serde(default, rename = "minimumInterval")]
    pub minimum_interval: Option<RawDuration>,

    /// Reserved; parsed but drives no behaviour.
    #[serde(default, rename = "timeToDeleteOld")]
    pub time_to_delete_old: Option<RawDuration>,

    /// Reserved; parsed but drives no behaviour.
    #[serde(default, rename = "countToDeleteOld", alias = "countTodeleteOld")]
    pub count_to_delete_old: Option<u64>,
}

/// A duration as it may appear in YAML: a bare integer (seconds) or a
/// string such as `"1m30s"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(u64),
    Text(String),
}

/// Validated configuration.
///
/// Only constructible via `TryFrom<RawConfigFile>` so every `ConfigFile` in
/// the program has normalized paths and parsed durations.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    sessions: BTreeMap<SessionName, SessionConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(sessions: BTreeMap<SessionName, SessionConfig>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &BTreeMap<SessionName, SessionConfig> {
        &self.sessions
    }

    pub fn session(&self, name: &str) -> Option<&SessionConfig> {
        self.sessions.get(name)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A validated session entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub dir: PathBuf,
    pub files: BTreeSet<String>,
    pub copy_to: PathBuf,
    pub compression: bool,
    pub minimum_interval: Duration,
    pub retention: Retention,
}

/// Retention settings carried through from the config file.
///
/// Nothing prunes old backups; these are kept so dry-run output reflects
/// what the user wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Retention {
    pub time_to_delete_old: Option<Duration>,
    pub count_to_delete_old: Option<u64>,
}
