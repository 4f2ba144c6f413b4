#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use autobackup::config::{ConfigFile, RawConfigFile, RawDuration, RawSessionConfig};
use autobackup::errors::Result;
use autobackup::session::Session;

/// Builder for `Session` to simplify test setup.
///
/// Bypasses config validation, so intervals below the one-second floor are
/// kept as given.
pub struct SessionBuilder {
    session: Session,
}

impl SessionBuilder {
    pub fn new(name: &str, directory: impl AsRef<Path>, destination: impl AsRef<Path>) -> Self {
        Self {
            session: Session {
                name: name.to_string(),
                directory: directory.as_ref().to_path_buf(),
                file_filter: BTreeSet::new(),
                destination: destination.as_ref().to_path_buf(),
                compress: false,
                minimum_interval: Duration::from_secs(5),
            },
        }
    }

    pub fn file(mut self, name: &str) -> Self {
        self.session.file_filter.insert(name.to_string());
        self
    }

    pub fn compress(mut self, val: bool) -> Self {
        self.session.compress = val;
        self
    }

    pub fn minimum_interval(mut self, interval: Duration) -> Self {
        self.session.minimum_interval = interval;
        self
    }

    pub fn build(self) -> Session {
        self.session
    }
}

/// Builder for `ConfigFile`, going through the same validation as a YAML file.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                sessions: BTreeMap::new(),
            },
        }
    }

    pub fn with_session(mut self, name: &str, session: RawSessionConfig) -> Self {
        self.config.sessions.insert(name.to_string(), session);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawSessionConfig`.
pub struct RawSessionBuilder {
    session: RawSessionConfig,
}

impl RawSessionBuilder {
    pub fn new(dir: impl AsRef<Path>, copy_to: impl AsRef<Path>) -> Self {
        Self {
            session: RawSessionConfig {
                dir: path_string(dir.as_ref()),
                files: vec![],
                copy_to: path_string(copy_to.as_ref()),
                compression: false,
                minimum_interval: None,
                time_to_delete_old: None,
                count_to_delete_old: None,
            },
        }
    }

    pub fn file(mut self, name: &str) -> Self {
        self.session.files.push(name.to_string());
        self
    }

    pub fn compression(mut self, val: bool) -> Self {
        self.session.compression = val;
        self
    }

    pub fn minimum_interval(mut self, text: &str) -> Self {
        self.session.minimum_interval = Some(RawDuration::Text(text.to_string()));
        self
    }

    pub fn minimum_interval_secs(mut self, secs: u64) -> Self {
        self.session.minimum_interval = Some(RawDuration::Seconds(secs));
        self
    }

    pub fn build(self) -> RawSessionConfig {
        self.session
    }
}

fn path_string(path: &Path) -> String {
    PathBuf::from(path).to_string_lossy().into_owned()
}
