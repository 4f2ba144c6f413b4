// src/watch/event.rs

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind};

/// Raw operation behind a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
    Other,
}

impl ChangeKind {
    /// Map a notify event kind. Access events (open, read, close without
    /// write) are not changes and map to `None`.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) => None,
            EventKind::Create(_) => Some(ChangeKind::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(ChangeKind::Chmod),
            EventKind::Modify(_) => Some(ChangeKind::Write),
            EventKind::Remove(_) => Some(ChangeKind::Remove),
            EventKind::Any | EventKind::Other => Some(ChangeKind::Other),
        }
    }
}

/// One observed change: the absolute path of the entry and what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one change per path.
    pub fn from_notify(event: notify::Event) -> Vec<ChangeEvent> {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return Vec::new();
        };
        event
            .paths
            .into_iter()
            .map(|path| ChangeEvent { path, kind })
            .collect()
    }
}
