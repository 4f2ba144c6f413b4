// src/snapshot/archive.rs

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{BackupError, Result};
use crate::snapshot::{base_name, SnapshotRequest, SnapshotWriter};

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Writes snapshots as a single gzip-compressed tar file.
///
/// Entries are stored as `<archive_root>/<source basename>/<relative path>`;
/// with an empty `archive_root` (the default) unpacking the archive next to
/// it reproduces the plain-copy layout.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    pub archive_root: String,
}

impl SnapshotWriter for ArchiveWriter {
    fn write(&self, request: &SnapshotRequest) -> Result<PathBuf> {
        let dest = request.target.path();
        archive_files(&request.sources, &self.archive_root, &dest)?;
        Ok(dest)
    }
}

/// Package `sources` into a `.tar.gz` at `dest_tar`.
///
/// Each source is stored under `<archive_root>/<basename>`; directories are
/// walked and only their files are stored. Entry names always use `/`.
///
/// Every source must exist before anything is created. If writing fails
/// partway, the incomplete archive is removed.
pub fn archive_files(sources: &[PathBuf], archive_root: &str, dest_tar: &Path) -> Result<()> {
    for src in sources {
        fs::metadata(src).map_err(|e| BackupError::snapshot("stat", src, dest_tar, e))?;
    }

    let result = write_archive(sources, archive_root, dest_tar);
    if result.is_err() {
        if let Err(e) = fs::remove_file(dest_tar) {
            debug!(dest = ?dest_tar, error = %e, "could not remove incomplete archive");
        }
    }
    result
}

fn write_archive(sources: &[PathBuf], archive_root: &str, dest_tar: &Path) -> Result<()> {
    if let Some(parent) = dest_tar.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BackupError::snapshot("create dir for", dest_tar, parent, e))?;
    }
    let file =
        File::create(dest_tar).map_err(|e| BackupError::snapshot("create", dest_tar, dest_tar, e))?;

    // On an early return the builder and encoder are dropped, which still
    // writes their trailers and closes the file.
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(true);

    for src in sources {
        let name = base_name(src).ok_or_else(|| {
            BackupError::snapshot(
                "archive",
                src,
                dest_tar,
                io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
            )
        })?;
        let entry_root = join_entry(archive_root, &name);
        store_to_tar(&mut builder, src, &entry_root, dest_tar)?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| BackupError::snapshot("finish tar", dest_tar, dest_tar, e))?;
    let mut file = encoder
        .finish()
        .map_err(|e| BackupError::snapshot("finish gzip", dest_tar, dest_tar, e))?;
    file.flush()
        .map_err(|e| BackupError::snapshot("flush", dest_tar, dest_tar, e))?;
    Ok(())
}

/// Store a file, or every file below a directory, under `entry_name`.
fn store_to_tar<W: Write>(
    builder: &mut tar::Builder<W>,
    src: &Path,
    entry_name: &str,
    dest_tar: &Path,
) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| BackupError::snapshot("stat", src, dest_tar, e))?;

    if !meta.is_dir() {
        return append_file(builder, src, entry_name, dest_tar);
    }

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BackupError::snapshot("walk", path, dest_tar, io::Error::other(e))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BackupError::snapshot("relativize", entry.path(), dest_tar, io::Error::other(e)))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        append_file(builder, entry.path(), &join_entry(entry_name, &rel), dest_tar)?;
    }

    Ok(())
}

fn append_file<W: Write>(
    builder: &mut tar::Builder<W>,
    src: &Path,
    entry_name: &str,
    dest_tar: &Path,
) -> Result<()> {
    debug!(src = ?src, entry = %entry_name, "adding file to archive");
    builder
        .append_path_with_name(src, entry_name)
        .map_err(|e| BackupError::snapshot("archive", src, dest_tar, e))
}

fn join_entry(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
