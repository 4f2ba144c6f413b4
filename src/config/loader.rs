// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// File name of the config file looked up next to the executable.
pub const DEFAULT_CONFIG_NAME: &str = "config.yaml";

/// Contents written when no config file exists yet.
pub const DEFAULT_CONFIG_CONTENT: &str = include_str!("default_config.yaml");

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs YAML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = serde_yaml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads YAML.
/// - Normalizes `dir` / `copyTo` to clean absolute paths.
/// - Parses durations and applies the interval floor.
/// - Checks that every watched directory exists.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `config.yaml` in the directory containing the running executable, or in
/// the current working directory if the executable path is unknown.
pub fn default_config_path() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(DEFAULT_CONFIG_NAME)
}

/// Whether [`ensure_default_config`] found a config or had to create one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultConfigStatus {
    Existing,
    Created,
}

/// Make sure a config exists at `path`, writing the built-in default if not.
pub fn ensure_default_config(path: impl AsRef<Path>) -> Result<DefaultConfigStatus> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(DefaultConfigStatus::Existing);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_CONTENT)?;
    info!(path = ?path, "default config created");
    Ok(DefaultConfigStatus::Created)
}
