use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use autobackup::errors::{BackupError, Result};
use autobackup::snapshot::{SnapshotRequest, SnapshotWriter};

/// A fake snapshot writer that:
/// - records every request it receives
/// - writes nothing to disk
/// - optionally fails every write
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    requests: Arc<Mutex<Vec<SnapshotRequest>>>,
    fail: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose every `write` returns an IO error.
    pub fn failing() -> Self {
        Self {
            requests: Arc::default(),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<SnapshotRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Paths the recorded requests would have produced.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.requests()
            .iter()
            .map(|r| r.target.path())
            .collect()
    }
}

impl SnapshotWriter for RecordingWriter {
    fn write(&self, request: &SnapshotRequest) -> Result<PathBuf> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(BackupError::IoError(io::Error::other("simulated write failure")));
        }
        Ok(request.target.path())
    }
}
