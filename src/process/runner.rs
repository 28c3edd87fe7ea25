//! Child process execution with concurrent output draining.
//!
//! [`ProcessRunner::run`] spawns one child per call, reads its stdout and
//! stderr on two independent tokio tasks while it runs, waits for it to exit,
//! and joins both readers before handing back a [`CapturedOutput`].

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{CapturedOutput, LaunchError, LaunchSpec, RunError, StreamKind};

/// Default time a child gets to exit after SIGTERM before it is killed.
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8192;

/// Something that can execute a [`LaunchSpec`] to completion.
///
/// [`ProcessRunner`] is the real implementation; the scenario driver only
/// depends on this trait.
#[async_trait]
pub trait Execute: Send + Sync {
    /// Run the spec and return its sealed output.
    ///
    /// # Errors
    ///
    /// Returns `RunError` if the process cannot be launched, its streams
    /// cannot be read, or it does not finish in time.
    async fn execute(&self, spec: &LaunchSpec) -> Result<CapturedOutput, RunError>;
}

/// Runs child processes and captures their output.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    terminate_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Create a runner that waits for children indefinitely.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            terminate_grace: DEFAULT_TERMINATE_GRACE,
        }
    }

    /// Bound each run; children still alive after `timeout` are terminated.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how long a terminated child gets between SIGTERM and SIGKILL.
    #[must_use]
    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    /// The configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Launch `spec`, drain both output streams, and wait for exit.
    ///
    /// A nonzero exit code is not an error; it is reported in the output.
    /// The timeout, when set, covers both the child's exit and the end of
    /// its output (a forked descendant can hold the pipes open).
    ///
    /// # Errors
    ///
    /// - `RunError::Launch` if the executable cannot be spawned.
    /// - `RunError::StreamDrain` if reading a pipe fails.
    /// - `RunError::TimedOut` if the child outlives the timeout.
    /// - `RunError::Wait` / `RunError::Join` on lower-level failures.
    pub async fn run(&self, spec: &LaunchSpec) -> Result<CapturedOutput, RunError> {
        tracing::info!(command = %spec.display_command(), "Launching process");

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = spec.working_dir() {
            cmd.current_dir(dir);
        }

        // Own process group, so termination reaches anything the child forks.
        #[cfg(unix)]
        cmd.process_group(0);

        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let mut child = cmd
            .spawn()
            .map_err(|e| LaunchError::from_io(spec.program(), e))?;
        let pid = child.id();
        tracing::debug!(pid, "Process started");

        let mut stdout_task = tokio::spawn(drain(child.stdout.take()));
        let mut stderr_task = tokio::spawn(drain(child.stderr.take()));

        let Some(waited) = bounded(deadline, child.wait()).await else {
            self.terminate(&mut child, pid).await;
            let stdout = partial(stdout_task, self.terminate_grace).await;
            let stderr = partial(stderr_task, self.terminate_grace).await;
            return Err(self.timed_out(pid, stdout, stderr));
        };
        let status = waited.map_err(RunError::Wait)?;

        let Some(joined) = bounded(deadline, &mut stdout_task).await else {
            self.terminate(&mut child, pid).await;
            let stdout = partial(stdout_task, self.terminate_grace).await;
            let stderr = partial(stderr_task, self.terminate_grace).await;
            return Err(self.timed_out(pid, stdout, stderr));
        };
        let stdout = collect_or_abort(joined, StreamKind::Stdout, &stderr_task)?;

        let Some(joined) = bounded(deadline, &mut stderr_task).await else {
            self.terminate(&mut child, pid).await;
            let stderr = partial(stderr_task, self.terminate_grace).await;
            return Err(self.timed_out(pid, stdout, stderr));
        };
        let stderr = collect(joined, StreamKind::Stderr)?;

        let elapsed = started.elapsed();
        tracing::debug!(
            pid,
            ?status,
            elapsed_ms = elapsed.as_millis(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Process finished"
        );

        Ok(CapturedOutput::new(
            stdout,
            stderr,
            status.code(),
            pid,
            elapsed,
        ))
    }

    fn timed_out(&self, pid: Option<u32>, stdout: String, stderr: String) -> RunError {
        let after = self.timeout.unwrap_or_default();
        tracing::warn!(pid, timeout = ?after, "Process timed out and was terminated");
        RunError::TimedOut {
            after,
            stdout,
            stderr,
        }
    }

    /// Terminate a child and its process group, then reap it.
    ///
    /// On Unix, sends SIGTERM to the group first, then SIGKILL after the
    /// grace period. On other platforms, kills the child immediately.
    async fn terminate(&self, child: &mut Child, pid: Option<u32>) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = pid {
                let pgid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
                let _ = killpg(pgid, Signal::SIGTERM);

                if tokio::time::timeout(self.terminate_grace, child.wait())
                    .await
                    .is_err()
                {
                    tracing::debug!(pid, "Process ignored SIGTERM, sending SIGKILL");
                }
                // Also reaches descendants that outlived the child.
                let _ = killpg(pgid, Signal::SIGKILL);
            }
            if let Err(e) = child.wait().await {
                tracing::warn!(error = %e, "Failed to reap terminated process");
            }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "Failed to kill process");
            }
        }
    }
}

#[async_trait]
impl Execute for ProcessRunner {
    async fn execute(&self, spec: &LaunchSpec) -> Result<CapturedOutput, RunError> {
        self.run(spec).await
    }
}

/// Await `fut`, giving up at `deadline` if there is one.
async fn bounded<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// A pipe read that failed part way through.
#[derive(Debug)]
struct DrainFailure {
    partial: Vec<u8>,
    source: std::io::Error,
}

type DrainResult = Result<Vec<u8>, DrainFailure>;

/// Read a pipe to EOF.
async fn drain<R>(pipe: Option<R>) -> DrainResult
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };

    let mut buf = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => return Ok(buf),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(DrainFailure {
                    partial: buf,
                    source,
                })
            }
        }
    }
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn collect(
    joined: Result<DrainResult, tokio::task::JoinError>,
    stream: StreamKind,
) -> Result<String, RunError> {
    match joined {
        Ok(Ok(bytes)) => Ok(into_text(bytes)),
        Ok(Err(failure)) => Err(RunError::StreamDrain {
            stream,
            source: failure.source,
            partial: into_text(failure.partial),
        }),
        Err(source) => Err(RunError::Join { stream, source }),
    }
}

/// Collect one stream; if it failed, stop the reader of the other.
fn collect_or_abort(
    joined: Result<DrainResult, tokio::task::JoinError>,
    stream: StreamKind,
    other: &JoinHandle<DrainResult>,
) -> Result<String, RunError> {
    collect(joined, stream).map_err(|e| {
        other.abort();
        e
    })
}

/// Whatever a drain task read before its child was terminated.
async fn partial(mut task: JoinHandle<DrainResult>, grace: Duration) -> String {
    match tokio::time::timeout(grace, &mut task).await {
        Ok(Ok(Ok(bytes))) => into_text(bytes),
        Ok(Ok(Err(failure))) => into_text(failure.partial),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            task.abort();
            String::new()
        }
    }
}
