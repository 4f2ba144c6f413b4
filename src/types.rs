use std::fmt;

/// Canonical session name type (the key of the session in the config file).
pub type SessionName = String;

/// Behaviour when one of the configured sessions fails to start watching.
///
/// - `FailFast`: abort startup and name the offending session (default).
/// - `KeepGoing`: log the failure and run with whichever sessions started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartupPolicy {
    #[default]
    FailFast,
    KeepGoing,
}

impl StartupPolicy {
    pub fn from_keep_going(keep_going: bool) -> Self {
        if keep_going {
            StartupPolicy::KeepGoing
        } else {
            StartupPolicy::FailFast
        }
    }
}

/// How a snapshot is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Plain recursive copy of the sources.
    Copy,
    /// A single `.tar.gz` archive.
    Archive,
}

impl SnapshotFormat {
    pub fn from_compress(compress: bool) -> Self {
        if compress {
            SnapshotFormat::Archive
        } else {
            SnapshotFormat::Copy
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFormat::Copy => f.write_str("copy"),
            SnapshotFormat::Archive => f.write_str("archive"),
        }
    }
}
