// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `autobackup`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autobackup",
    version,
    about = "Watch directories and back up changed files into timestamped snapshots.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (YAML).
    ///
    /// Default: `config.yaml` next to the executable. If that file does not
    /// exist yet, a default one is written there and the program exits.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTOBACKUP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print sessions, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Keep running with the sessions that started if some fail to start.
    #[arg(long)]
    pub keep_going: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
