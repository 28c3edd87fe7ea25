//! Captured output of a terminated child process.

use std::time::Duration;

use serde::Serialize;

use super::StreamKind;

/// Everything a finished child wrote, plus how it exited.
///
/// Only produced once the process has exited and both of its output streams
/// have been read to EOF, so the contents never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    pid: Option<u32>,
    #[serde(with = "duration_millis")]
    elapsed: Duration,
}

impl CapturedOutput {
    pub(crate) fn new(
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
        pid: Option<u32>,
        elapsed: Duration,
    ) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            pid,
            elapsed,
        }
    }

    /// Build an output directly from text, for exercising analyzers
    /// without a real process.
    #[must_use]
    pub fn from_parts(
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::new(stdout.into(), stderr.into(), exit_code, None, Duration::ZERO)
    }

    /// Standard output text.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Standard error text.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Text of one stream.
    #[must_use]
    pub fn stream(&self, kind: StreamKind) -> &str {
        match kind {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }

    /// Exit code, or `None` if the child was terminated by a signal.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Whether the child exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// OS process id the child ran as.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wall-clock time from spawn to the end of draining.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}
