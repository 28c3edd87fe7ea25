//! Scenario driver: launches each scenario and checks its output.

use crate::analyzer::OutputAnalyzer;
use crate::config::{ConfigError, HarnessConfig};
use crate::process::{Execute, LaunchSpec};

use super::{RunReport, Scenario, ScenarioOutcome, ScenarioState, ScenarioStateMachine};

/// Runs scenarios one after another through an [`Execute`] implementation.
pub struct ScenarioDriver<E> {
    executor: E,
    config: HarnessConfig,
    java: String,
}

impl<E: Execute> ScenarioDriver<E> {
    /// Create a driver; the launcher path is resolved once, here.
    #[must_use]
    pub fn new(executor: E, config: HarnessConfig) -> Self {
        let java = config.java_path();
        Self {
            executor,
            config,
            java,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Build the launch line for one scenario.
    ///
    /// `[java, base flags..., env flags..., scenario flag, -cp path, entry point, mode args...]`
    #[must_use]
    pub fn launch_spec(&self, scenario: &Scenario) -> LaunchSpec {
        let mut builder = LaunchSpec::builder(&self.java).flags(&self.config.base_flags);
        if !self.config.vm_opts_env.is_empty() {
            builder = builder.flags_from_env(&self.config.vm_opts_env);
        }
        builder = builder.flags(scenario.flag.iter());
        if let Some(cp) = &self.config.classpath {
            builder = builder.flags(["-cp", cp.as_str()]);
        }
        builder
            .entry_point(&self.config.entry_point)
            .args(scenario.mode.program_args().iter().copied())
            .build()
    }

    /// Run one scenario to a terminal state.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let spec = self.launch_spec(scenario);
        let mut state = ScenarioStateMachine::new(&scenario.name);
        let mut outcome = ScenarioOutcome::new(&scenario.name, spec.display_command());

        tracing::info!(scenario = %scenario.name, "Running scenario");
        state.transition(ScenarioState::Running);

        match self.executor.execute(&spec).await {
            Err(error) => {
                tracing::error!(scenario = %scenario.name, error = %error, "Scenario did not run");
                state.transition(ScenarioState::Failed);
                outcome.error = Some(error);
            }
            Ok(output) => {
                state.transition(ScenarioState::Captured);
                let analyzer = OutputAnalyzer::new(&output).with_stream(scenario.stream);
                match analyzer.check_all(&scenario.expectations()) {
                    Ok(()) => {
                        state.transition(ScenarioState::Passed);
                    }
                    Err(violations) => {
                        tracing::warn!(
                            scenario = %scenario.name,
                            count = violations.len(),
                            "Scenario assertions failed"
                        );
                        state.transition(ScenarioState::Failed);
                        outcome.violations = Some(violations);
                    }
                }
                outcome.output = Some(output);
            }
        }

        outcome.state = state.state();
        outcome
    }

    /// Run every scenario in order. A failing scenario does not stop the rest.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> RunReport {
        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            outcomes.push(self.run_scenario(scenario).await);
        }
        let report = RunReport::new(outcomes);
        tracing::info!(
            passed = report.passed().count(),
            failed = report.failed().count(),
            "All scenarios finished"
        );
        report
    }
}

/// Keep only the named scenarios, in the order given; all of them if `names` is empty.
///
/// # Errors
///
/// Returns `ConfigError::UnknownScenario` for a name that matches nothing.
pub fn select_scenarios(
    scenarios: Vec<Scenario>,
    names: &[String],
) -> Result<Vec<Scenario>, ConfigError> {
    if names.is_empty() {
        return Ok(scenarios);
    }
    names
        .iter()
        .map(|name| {
            scenarios
                .iter()
                .find(|s| &s.name == name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownScenario(name.clone()))
        })
        .collect()
}
