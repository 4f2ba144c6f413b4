// src/lib.rs

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod logging;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod watch;

use std::path::Path;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{
    default_config_path, ensure_default_config, load_and_validate, ConfigFile,
    DefaultConfigStatus,
};
use crate::dispatcher::Dispatcher;
use crate::errors::Result;
use crate::types::StartupPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (bootstrapping a default config if needed)
/// - one watcher per session via the [`Dispatcher`]
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let launch_time = Instant::now();

    let config_path = match args.config {
        Some(ref path) => path.clone(),
        None => {
            let path = default_config_path();
            if ensure_default_config(&path)? == DefaultConfigStatus::Created {
                println!("default config created: {}", path.display());
                println!("edit it and start autobackup again");
                return Ok(());
            }
            path
        }
    };

    let cfg = load_and_validate(&config_path)?;
    info!(config = ?config_path, sessions = cfg.len(), "config loaded");

    if args.dry_run {
        print_dry_run(&config_path, &cfg);
        return Ok(());
    }

    let policy = StartupPolicy::from_keep_going(args.keep_going);
    let dispatcher = Dispatcher::from_config(&cfg, policy, launch_time);
    let handles = dispatcher.start()?;

    info!("Listening...");

    // Run until Ctrl-C; there is nothing else that ends the process.
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }

    info!("shutdown requested, stopping watchers");
    drop(handles);
    Ok(())
}

/// Simple dry-run output: print every session as it will be run.
fn print_dry_run(config_path: &Path, cfg: &ConfigFile) {
    println!("autobackup dry-run");
    println!("  config = {}", config_path.display());
    println!();

    println!("sessions ({}):", cfg.len());
    for (name, session) in cfg.sessions().iter() {
        println!("  - {name}");
        println!("      dir: {}", session.dir.display());
        if session.files.is_empty() {
            println!("      files: (whole directory)");
        } else {
            println!("      files: {:?}", session.files);
        }
        println!("      copyTo: {}", session.copy_to.display());
        println!("      compression: {}", session.compression);
        println!("      minimumInterval: {:?}", session.minimum_interval);
        if let Some(d) = session.retention.time_to_delete_old {
            println!("      timeToDeleteOld: {d:?} (unused)");
        }
        if let Some(n) = session.retention.count_to_delete_old {
            println!("      countToDeleteOld: {n} (unused)");
        }
    }

    debug!("dry-run complete (nothing watched)");
}
