// src/snapshot/mod.rs

//! Snapshot writers.
//!
//! A snapshot is the current state of a session's sources written under a
//! timestamped directory:
//!
//! - plain copy: `<destination>/<unix-seconds>/<name>`
//! - archive:    `<destination>/<unix-seconds>/<name>.tar.gz`
//!
//! The session handler talks to a [`SnapshotWriter`] rather than to the copy
//! or archive functions directly, so tests can swap in a recording writer.

pub mod archive;
pub mod copy;

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::Result;
use crate::types::{SessionName, SnapshotFormat};

pub use archive::{archive_files, ArchiveWriter, ARCHIVE_EXTENSION};
pub use copy::{copy_dir, copy_file, copy_path, PlainCopyWriter};

/// Where a snapshot lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    /// `<destination>/<unix-seconds>`
    pub root: PathBuf,
    /// Basename of the session directory or of the changed file.
    pub name: String,
    pub format: SnapshotFormat,
}

impl SnapshotTarget {
    pub fn new(
        destination: &Path,
        unix_seconds: u64,
        name: impl Into<String>,
        format: SnapshotFormat,
    ) -> Self {
        Self {
            root: destination.join(unix_seconds.to_string()),
            name: name.into(),
            format,
        }
    }

    /// Final path of the snapshot (directory/file copy or archive file).
    pub fn path(&self) -> PathBuf {
        match self.format {
            SnapshotFormat::Copy => self.root.join(&self.name),
            SnapshotFormat::Archive => self
                .root
                .join(format!("{}.{}", self.name, ARCHIVE_EXTENSION)),
        }
    }
}

/// Everything a writer needs to produce one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub session: SessionName,
    pub sources: Vec<PathBuf>,
    pub target: SnapshotTarget,
}

/// Trait abstracting how snapshots are written.
///
/// Implementations do blocking filesystem IO; callers run them on a blocking
/// thread.
pub trait SnapshotWriter: Send + Sync + Debug {
    /// Write the snapshot and return the path that was produced.
    fn write(&self, request: &SnapshotRequest) -> Result<PathBuf>;
}

/// The production writer for a given format.
pub fn writer_for(format: SnapshotFormat) -> Arc<dyn SnapshotWriter> {
    match format {
        SnapshotFormat::Copy => Arc::new(PlainCopyWriter),
        SnapshotFormat::Archive => Arc::new(ArchiveWriter::default()),
    }
}

/// Last path component as a `String`, if there is one.
pub(crate) fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
