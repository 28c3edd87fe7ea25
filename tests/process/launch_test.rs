//! Tests for launch specs and spawn failures.

use gc_harness::process::{LaunchError, LaunchSpec, ProcessRunner, RunError};

#[test]
fn builder_keeps_flags_before_entry_point() {
    let spec = LaunchSpec::builder("java")
        .flags(["-Xmx128m", "-Xlog:gc"])
        .entry_point("TestExplicitGC")
        .arg("test")
        .flag("-XX:+DisableExplicitGC")
        .build();

    let argv = spec.argv();
    let entry = argv.iter().position(|a| a == "TestExplicitGC").unwrap();
    let flag = argv.iter().position(|a| a == "-XX:+DisableExplicitGC").unwrap();
    assert!(flag < entry);
    assert_eq!(argv.last().map(String::as_str), Some("test"));
}

#[test]
fn spec_is_clone_and_eq() {
    let spec = LaunchSpec::builder("java").flag("-Xmx128m").build();
    assert_eq!(spec.clone(), spec);
}

#[test]
fn builder_working_dir() {
    let spec = LaunchSpec::builder("java").working_dir("/tmp/work").build();
    assert_eq!(
        spec.working_dir(),
        Some(&std::path::PathBuf::from("/tmp/work"))
    );
}

#[tokio::test]
async fn run_missing_executable_is_launch_error() {
    let spec = LaunchSpec::builder("gc-harness-definitely-not-a-real-binary").build();
    let err = ProcessRunner::new().run(&spec).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Launch(LaunchError::NotFound(ref p)) if p == "gc-harness-definitely-not-a-real-binary"
    ));
}
