//! Process execution error types.

use std::fmt;
use std::time::Duration;

/// Which output stream of the child a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Error type for process spawning.
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    /// The argument vector had no program.
    #[error("Empty argument vector")]
    EmptyArgv,
    /// The executable was not found.
    #[error("Executable not found: {0}")]
    NotFound(String),
    /// Permission denied when spawning.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Other I/O error.
    #[error("Failed to spawn {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Create a `LaunchError` from an I/O error, classifying common cases.
    pub(crate) fn from_io(program: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(program.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(program.to_string()),
            _ => Self::Io {
                program: program.to_string(),
                source: err,
            },
        }
    }
}

/// Error type for a complete run of one child process.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The child could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Reading one of the child's pipes failed.
    #[error("Failed to read {stream}: {source}")]
    StreamDrain {
        stream: StreamKind,
        source: std::io::Error,
        /// Text read from the stream before the failure.
        partial: String,
    },

    /// The child outlived the configured timeout and was terminated.
    #[error("Process did not exit within {after:?} and was terminated")]
    TimedOut {
        after: Duration,
        /// Partial standard output at termination.
        stdout: String,
        /// Partial standard error at termination.
        stderr: String,
    },

    /// Waiting on the child failed.
    #[error("Failed to wait for process: {0}")]
    Wait(std::io::Error),

    /// A drain task panicked or was cancelled.
    #[error("Drain task for {stream} did not complete: {source}")]
    Join {
        stream: StreamKind,
        source: tokio::task::JoinError,
    },
}
