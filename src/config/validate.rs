// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, RawConfigFile, RawDuration, RawSessionConfig, Retention, SessionConfig,
};
use crate::errors::{BackupError, Result};

/// Smallest accepted `minimumInterval`. Lower (or missing) values are raised
/// to this floor.
pub const MIN_INTERVAL_FLOOR: Duration = Duration::from_secs(1);

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BackupError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_sessions(&raw)?;

        let mut sessions = BTreeMap::new();
        for (name, session) in raw.sessions.iter() {
            let validated = validate_session(name, session)?;
            sessions.insert(name.clone(), validated);
        }

        Ok(ConfigFile::new_unchecked(sessions))
    }
}

fn ensure_has_sessions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.sessions.is_empty() {
        return Err(BackupError::ConfigError(
            "config must contain at least one session".to_string(),
        ));
    }
    Ok(())
}

fn validate_session(name: &str, raw: &RawSessionConfig) -> Result<SessionConfig> {
    let dir = normalize_dir_field(name, "dir", &raw.dir)?;
    let copy_to = normalize_dir_field(name, "copyTo", &raw.copy_to)?;

    if !dir.is_dir() {
        return Err(BackupError::ConfigError(format!(
            "session '{}': dir {:?} does not exist or is not a directory",
            name, dir
        )));
    }

    if copy_to.starts_with(&dir) {
        return Err(BackupError::ConfigError(format!(
            "session '{}': copyTo {:?} must not be inside the watched dir {:?}",
            name, copy_to, dir
        )));
    }

    let files = validate_file_names(name, &raw.files)?;

    let minimum_interval = match &raw.minimum_interval {
        Some(d) => resolve_duration(name, "minimumInterval", d)?,
        None => Duration::ZERO,
    }
    .max(MIN_INTERVAL_FLOOR);

    let time_to_delete_old = raw
        .time_to_delete_old
        .as_ref()
        .map(|d| resolve_duration(name, "timeToDeleteOld", d))
        .transpose()?;

    Ok(SessionConfig {
        dir,
        files,
        copy_to,
        compression: raw.compression,
        minimum_interval,
        retention: Retention {
            time_to_delete_old,
            count_to_delete_old: raw.count_to_delete_old,
        },
    })
}

fn normalize_dir_field(session: &str, field: &str, value: &str) -> Result<PathBuf> {
    if value.trim().is_empty() {
        return Err(BackupError::ConfigError(format!(
            "session '{}': `{}` must not be empty",
            session, field
        )));
    }
    let absolute = std::path::absolute(Path::new(value.trim()))?;
    Ok(clean_path(&absolute))
}

/// Entries in `files` are matched against event basenames, so they must be
/// bare file names.
fn validate_file_names(session: &str, files: &[String]) -> Result<BTreeSet<String>> {
    let mut set = BTreeSet::new();
    for file in files {
        let trimmed = file.trim();
        let mut components = Path::new(trimmed).components();
        let is_bare_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_bare_name {
            return Err(BackupError::ConfigError(format!(
                "session '{}': files entry '{}' must be a plain file name",
                session, file
            )));
        }
        set.insert(trimmed.to_string());
    }
    Ok(set)
}

fn resolve_duration(session: &str, field: &str, raw: &RawDuration) -> Result<Duration> {
    match raw {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(*secs)),
        RawDuration::Text(text) => parse_duration(text).map_err(|e| {
            BackupError::ConfigError(format!("session '{}': invalid `{}`: {}", session, field, e))
        }),
    }
}

/// Lexically clean a path: drop `.` components and resolve `..` against the
/// preceding component. Does not touch the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
