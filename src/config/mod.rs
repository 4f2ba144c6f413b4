// src/config/mod.rs

//! Configuration loading and validation for autobackup.
//!
//! Responsibilities:
//! - Define the YAML-backed data model (`model.rs`).
//! - Load a config file from disk, bootstrapping a default one (`loader.rs`).
//! - Parse duration strings like `"1m30s"` (`duration.rs`).
//! - Normalize paths and validate sessions (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{
    default_config_path, ensure_default_config, load_and_validate, load_from_path,
    DefaultConfigStatus, DEFAULT_CONFIG_NAME,
};
pub use model::{
    ConfigFile, RawConfigFile, RawDuration, RawSessionConfig, Retention, SessionConfig,
};
pub use validate::{clean_path, MIN_INTERVAL_FLOOR};
