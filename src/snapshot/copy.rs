// src/snapshot/copy.rs

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{BackupError, Result};
use crate::snapshot::{base_name, SnapshotRequest, SnapshotWriter};

/// Writes snapshots as a plain recursive copy.
///
/// Each source lands at `<root>/<source basename>`. A failure partway leaves
/// whatever was already copied in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCopyWriter;

impl SnapshotWriter for PlainCopyWriter {
    fn write(&self, request: &SnapshotRequest) -> Result<PathBuf> {
        let root = &request.target.root;
        for src in &request.sources {
            let name = base_name(src).ok_or_else(|| {
                BackupError::snapshot(
                    "copy",
                    src,
                    root,
                    io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
                )
            })?;
            copy_path(src, &root.join(name))?;
        }
        Ok(request.target.path())
    }
}

/// Copy a file or a directory tree to `dest`.
pub fn copy_path(src: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| BackupError::snapshot("stat", src, dest, e))?;
    if meta.is_dir() {
        copy_dir(src, dest)
    } else {
        copy_file(src, dest)
    }
}

/// Copy a single file, creating missing parent directories of `dest`.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    let mut source = File::open(src).map_err(|e| BackupError::snapshot("open", src, dest, e))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BackupError::snapshot("create dir for", src, parent, e))?;
    }

    let mut target =
        File::create(dest).map_err(|e| BackupError::snapshot("create", src, dest, e))?;
    io::copy(&mut source, &mut target).map_err(|e| BackupError::snapshot("copy", src, dest, e))?;
    Ok(())
}

/// Recursively copy the directory `src` to `dest`, preserving structure.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| BackupError::snapshot("create dir for", src, dest, e))?;

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BackupError::snapshot("walk", path, dest, io::Error::other(e))
        })?;

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BackupError::snapshot("relativize", entry.path(), dest, io::Error::other(e)))?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| BackupError::snapshot("create dir for", entry.path(), &target, e))?;
        } else {
            debug!(src = ?entry.path(), dest = ?target, "copying file");
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}
