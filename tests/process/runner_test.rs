//! Tests for running child processes and capturing their output.

use std::time::{Duration, Instant};

use gc_harness::process::{LaunchSpec, ProcessRunner, RunError};

fn sh(script: &str) -> LaunchSpec {
    LaunchSpec::from_argv(["sh", "-c", script]).unwrap()
}

#[tokio::test]
async fn run_captures_stdout_and_exit_code() {
    let spec = LaunchSpec::builder("echo").arg("Pause Init Mark").build();
    let output = ProcessRunner::new().run(&spec).await.unwrap();

    assert_eq!(output.stdout(), "Pause Init Mark\n");
    assert_eq!(output.stderr(), "");
    assert_eq!(output.exit_code(), Some(0));
    assert!(output.success());
    assert!(output.pid().is_some());
}

#[tokio::test]
async fn run_keeps_streams_separate() {
    let output = ProcessRunner::new()
        .run(&sh("echo out; echo err >&2"))
        .await
        .unwrap();

    assert_eq!(output.stdout(), "out\n");
    assert_eq!(output.stderr(), "err\n");
}

#[tokio::test]
async fn nonzero_exit_is_data_not_error() {
    let output = ProcessRunner::new()
        .run(&sh("echo partial; exit 3"))
        .await
        .unwrap();

    assert_eq!(output.exit_code(), Some(3));
    assert!(!output.success());
    assert_eq!(output.stdout(), "partial\n");
}

#[tokio::test]
async fn arguments_are_not_shell_interpreted() {
    let spec = LaunchSpec::builder("echo").arg("$HOME; echo injected").build();
    let output = ProcessRunner::new().run(&spec).await.unwrap();

    assert_eq!(output.stdout(), "$HOME; echo injected\n");
}

#[tokio::test]
async fn signal_termination_has_no_exit_code() {
    let output = ProcessRunner::new()
        .run(&sh("kill -9 $$"))
        .await
        .unwrap();

    assert_eq!(output.exit_code(), None);
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let output = ProcessRunner::new()
        .run(&sh(r"printf 'a\377b'"))
        .await
        .unwrap();

    assert_eq!(output.stdout(), "a\u{fffd}b");
}

#[tokio::test]
async fn large_output_on_both_streams_does_not_deadlock() {
    // 1 MiB to stderr before anything reaches stdout, then 1 MiB to stdout.
    // Far above any pipe buffer, so a runner that reads one stream to EOF
    // before touching the other would stall the child forever.
    let script = "head -c 1048576 /dev/zero | tr '\\0' e >&2; \
                  head -c 1048576 /dev/zero | tr '\\0' o";
    let runner = ProcessRunner::new().with_timeout(Duration::from_secs(60));
    let output = runner.run(&sh(script)).await.unwrap();

    assert_eq!(output.stdout().len(), 1_048_576);
    assert_eq!(output.stderr().len(), 1_048_576);
    assert!(output.stdout().bytes().all(|b| b == b'o'));
    assert!(output.stderr().bytes().all(|b| b == b'e'));
    assert_eq!(output.exit_code(), Some(0));
}

#[tokio::test]
async fn output_is_complete_when_run_returns() {
    // The last write happens immediately before exit.
    let output = ProcessRunner::new()
        .run(&sh("for i in $(seq 1 2000); do echo line$i; done; echo done >&2"))
        .await
        .unwrap();

    assert_eq!(output.stdout().lines().count(), 2000);
    assert!(output.stdout().ends_with("line2000\n"));
    assert_eq!(output.stderr(), "done\n");
}

#[tokio::test]
async fn timeout_terminates_child() {
    let runner = ProcessRunner::new()
        .with_timeout(Duration::from_millis(300))
        .with_terminate_grace(Duration::from_secs(2));
    let started = Instant::now();
    let err = runner
        .run(&sh("echo started; sleep 30"))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    match err {
        RunError::TimedOut { after, stdout, .. } => {
            assert_eq!(after, Duration::from_millis(300));
            assert_eq!(stdout, "started\n");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_kills_child_ignoring_sigterm() {
    let runner = ProcessRunner::new()
        .with_timeout(Duration::from_millis(200))
        .with_terminate_grace(Duration::from_millis(300));
    let started = Instant::now();
    let err = runner
        .run(&sh("trap '' TERM; sleep 30"))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn fast_child_within_timeout_succeeds() {
    let runner = ProcessRunner::new().with_timeout(Duration::from_secs(30));
    let output = runner.run(&sh("echo quick")).await.unwrap();
    assert_eq!(output.stdout(), "quick\n");
}

#[tokio::test]
async fn run_in_working_dir() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let temp_path = temp_dir.path().canonicalize().unwrap();

    let spec = LaunchSpec::builder("pwd").working_dir(&temp_path).build();
    let output = ProcessRunner::new().run(&spec).await.unwrap();

    assert_eq!(output.stdout().trim(), temp_path.to_str().unwrap());
}

#[tokio::test]
async fn concurrent_runs_do_not_interfere() {
    let runner = ProcessRunner::new();
    let a = sh("echo alpha");
    let b = sh("echo beta >&2; exit 4");
    let (ra, rb) = tokio::join!(runner.run(&a), runner.run(&b));

    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_eq!(ra.stdout(), "alpha\n");
    assert_eq!(ra.exit_code(), Some(0));
    assert_eq!(rb.stderr(), "beta\n");
    assert_eq!(rb.exit_code(), Some(4));
}
