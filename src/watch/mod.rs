// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) per session.
//! - Turning notify events into [`ChangeEvent`]s.
//! - Running each session's worker loop, which applies the session's name
//!   filter and hands accepted changes to its
//!   [`SessionHandler`](crate::session::SessionHandler).

pub mod event;
pub mod watcher;

pub use event::{ChangeEvent, ChangeKind};
pub use watcher::{
    run_session_loop, start_session_watcher, SessionExit, WatchMessage, WatcherHandle,
};
