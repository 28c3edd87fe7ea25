//! Scenario outcomes and run reports.

use serde::{Serialize, Serializer};

use crate::analyzer::Violations;
use crate::process::{CapturedOutput, RunError};

use super::ScenarioState;

/// Result of running one scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Launch line, shell-quoted for display.
    pub command: String,
    pub state: ScenarioState,
    pub output: Option<CapturedOutput>,
    pub violations: Option<Violations>,
    #[serde(serialize_with = "error_message")]
    pub error: Option<RunError>,
}

fn error_message<S: Serializer>(error: &Option<RunError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

impl ScenarioOutcome {
    pub(crate) fn new(name: impl Into<String>, command: String) -> Self {
        Self {
            name: name.into(),
            command,
            state: ScenarioState::Pending,
            output: None,
            violations: None,
            error: None,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Outcomes of a whole run, in execution order.
#[derive(Debug, Serialize)]
pub struct RunReport {
    outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn new(outcomes: Vec<ScenarioOutcome>) -> Self {
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    pub fn passed(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| o.passed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// True when every scenario passed. An empty run counts as passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }
}
