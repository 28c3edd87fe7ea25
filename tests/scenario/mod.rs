//! Scenario tests against the `fake-jvm` launcher.

mod fake_jvm_test;

/// Verify all public scenario types are exported from the library.
#[test]
fn test_all_scenario_types_exported() {
    use gc_harness::scenario::{
        explicit_gc_scenarios, select_scenarios, RunReport, Scenario, ScenarioDriver,
        ScenarioOutcome, ScenarioState, ScenarioStateMachine, BASE_FLAGS, CONCURRENT_MARKERS,
        FULL_MARKER,
    };

    let _ = ScenarioStateMachine::new("x");
    let _ = ScenarioDriver::new(
        gc_harness::process::ProcessRunner::new(),
        gc_harness::config::HarnessConfig::default(),
    );
    let _: fn(&RunReport) -> bool = RunReport::all_passed;
    let _: fn(&ScenarioOutcome) -> bool = ScenarioOutcome::passed;
    let _ = Scenario::new("x");
    let _ = ScenarioState::Pending;
    assert_eq!(explicit_gc_scenarios().len(), 4);
    assert!(select_scenarios(Vec::new(), &[]).unwrap().is_empty());
    assert_eq!(BASE_FLAGS.len(), 4);
    assert_eq!(CONCURRENT_MARKERS.len(), 2);
    assert_eq!(FULL_MARKER, "Pause Full");
}
