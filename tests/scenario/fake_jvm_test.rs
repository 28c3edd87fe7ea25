//! End-to-end scenario runs against the `fake-jvm` launcher.

use gc_harness::analyzer::OutputAnalyzer;
use gc_harness::config::HarnessConfig;
use gc_harness::process::ProcessRunner;
use gc_harness::scenario::{explicit_gc_scenarios, Scenario, ScenarioDriver, ScenarioState};
use gc_harness::simulate::Mode;

const FAKE_JVM: &str = env!("CARGO_BIN_EXE_fake-jvm");

fn config() -> HarnessConfig {
    HarnessConfig {
        java: Some(FAKE_JVM.to_string()),
        vm_opts_env: String::new(),
        timeout_secs: 60,
        ..Default::default()
    }
}

fn driver(config: HarnessConfig) -> ScenarioDriver<ProcessRunner> {
    let runner = ProcessRunner::new().with_timeout(std::time::Duration::from_secs(60));
    ScenarioDriver::new(runner, config)
}

async fn stdout_for(flag: Option<&str>) -> String {
    let mut scenario = Scenario::new("probe");
    scenario.flag = flag.map(String::from);
    let d = driver(config());
    let spec = d.launch_spec(&scenario);
    let output = ProcessRunner::new().run(&spec).await.unwrap();
    assert_eq!(output.exit_code(), Some(0), "{}", output.stderr());
    output.stdout().to_string()
}

#[tokio::test]
async fn all_builtin_scenarios_pass() {
    let report = driver(config()).run_all(&explicit_gc_scenarios()).await;

    for outcome in report.outcomes() {
        assert_eq!(
            outcome.state,
            ScenarioState::Passed,
            "{}: {:?} {:?}",
            outcome.name,
            outcome.violations,
            outcome.error
        );
    }
    assert!(report.all_passed());
}

#[tokio::test]
async fn default_runs_concurrent_cycle() {
    let text = stdout_for(None).await;
    let output = gc_harness::process::CapturedOutput::from_parts(text, "", Some(0));
    let analyzer = OutputAnalyzer::new(&output);

    assert!(analyzer.should_contain("Pause Init Mark").is_ok());
    assert!(analyzer.should_contain("Pause Final Mark").is_ok());
    assert!(analyzer.should_not_contain("Pause Full").is_ok());
}

#[tokio::test]
async fn disable_explicit_gc_logs_no_pauses() {
    let text = stdout_for(Some("-XX:+DisableExplicitGC")).await;

    assert!(text.contains("Calling System.gc()"));
    for marker in ["Pause Init Mark", "Pause Final Mark", "Pause Full"] {
        assert!(!text.contains(marker), "unexpected {marker} in:\n{text}");
    }
}

#[tokio::test]
async fn invokes_concurrent_runs_concurrent_cycle() {
    let text = stdout_for(Some("-XX:+ExplicitGCInvokesConcurrent")).await;

    assert!(text.contains("Pause Init Mark"));
    assert!(text.contains("Pause Final Mark"));
    assert!(!text.contains("Pause Full"));
}

#[tokio::test]
async fn not_invokes_concurrent_runs_full_collection() {
    let text = stdout_for(Some("-XX:-ExplicitGCInvokesConcurrent")).await;

    assert!(text.contains("Pause Full"));
    assert!(!text.contains("Pause Init Mark"));
    assert!(!text.contains("Pause Final Mark"));
}

#[tokio::test]
async fn locked_experimental_flags_fail_every_scenario() {
    let config = HarnessConfig {
        base_flags: vec!["-Xmx128m".into(), "-XX:+UseShenandoahGC".into(), "-Xlog:gc".into()],
        ..config()
    };
    let report = driver(config).run_all(&explicit_gc_scenarios()).await;

    // The VM refuses to start, so even scenarios that only forbid markers fail
    // on the exit value.
    assert_eq!(report.failed().count(), 4);
    let disable = &report.outcomes()[1];
    let output = disable.output.as_ref().unwrap();
    assert_eq!(output.exit_code(), Some(1));
    assert!(output.stderr().contains("experimental"));
}

#[tokio::test]
async fn default_mode_never_collects() {
    let scenario = Scenario::new("idle")
        .mode(Mode::Default)
        .patterns(
            gc_harness::analyzer::PatternSet::new()
                .forbid(["Calling System.gc()", "Pause Init Mark", "Pause Full"]),
        )
        .expect_exit(0);

    let outcome = driver(config()).run_scenario(&scenario).await;
    assert!(outcome.passed(), "{:?}", outcome.violations);
}

#[tokio::test]
async fn missing_launcher_fails_scenario_with_launch_error() {
    let config = HarnessConfig {
        java: Some("/nonexistent/bin/java".into()),
        ..config()
    };
    let outcome = driver(config)
        .run_scenario(&explicit_gc_scenarios()[0])
        .await;

    assert_eq!(outcome.state, ScenarioState::Failed);
    assert!(matches!(
        outcome.error,
        Some(gc_harness::process::RunError::Launch(_))
    ));
}
