// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SessionName;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    /// The notification subscription for a session could not be established.
    #[error("failed to watch dir {dir:?} in session '{session}': {source}")]
    SessionSetup {
        session: SessionName,
        dir: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Every configured session failed to start.
    #[error("none of the {failed} configured sessions could be started")]
    NoSessionsStarted { failed: usize },

    /// A copy or archive operation failed partway.
    #[error("failed to {op} {src:?} to {dest:?}: {source}")]
    Snapshot {
        op: &'static str,
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackupError {
    pub(crate) fn snapshot(
        op: &'static str,
        src: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        BackupError::Snapshot {
            op,
            src: src.into(),
            dest: dest.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BackupError>;
