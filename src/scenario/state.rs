//! Scenario state machine.

use serde::{Deserialize, Serialize};

/// Where a scenario is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioState {
    #[default]
    Pending,
    /// The child process has been launched.
    Running,
    /// The child exited and its output was fully drained.
    Captured,
    Passed,
    Failed,
}

impl ScenarioState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running | Self::Captured, Self::Failed)
                | (Self::Running, Self::Captured)
                | (Self::Captured, Self::Passed)
        )
    }
}

/// State machine for tracking one scenario's progress.
#[derive(Debug, Clone)]
pub struct ScenarioStateMachine {
    scenario: String,
    state: ScenarioState,
}

impl ScenarioStateMachine {
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            state: ScenarioState::Pending,
        }
    }

    #[must_use]
    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// Move to `new_state`. Returns false, leaving the state unchanged, if
    /// the transition is not part of the lifecycle.
    pub fn transition(&mut self, new_state: ScenarioState) -> bool {
        if !self.state.allows(new_state) {
            tracing::warn!(
                scenario = %self.scenario,
                from = ?self.state,
                to = ?new_state,
                "Ignoring invalid state transition"
            );
            return false;
        }
        tracing::debug!(scenario = %self.scenario, from = ?self.state, to = ?new_state, "State transition");
        self.state = new_state;
        true
    }
}
