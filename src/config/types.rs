//! Configuration types.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scenario::{explicit_gc_scenarios, Scenario, BASE_FLAGS};

use super::ConfigError;

/// Environment variable whose whitespace-separated contents are appended to the base flags.
pub const DEFAULT_VM_OPTS_ENV: &str = "GC_HARNESS_VM_OPTS";

/// Configuration for a harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Runtime launcher. Defaults to `$JAVA_HOME/bin/java`, then `java`.
    pub java: Option<String>,
    /// Class path holding the probe.
    pub classpath: Option<String>,
    /// Main class of the probe.
    pub entry_point: String,
    /// Flags passed to every scenario, before the scenario's own flag.
    pub base_flags: Vec<String>,
    /// Per-process timeout in seconds; 0 waits forever.
    pub timeout_secs: u64,
    /// Environment variable with extra runtime flags.
    pub vm_opts_env: String,
    /// Scenarios to run; empty means the built-in explicit-GC scenarios.
    #[serde(rename = "scenario")]
    pub scenarios: Vec<Scenario>,
}

fn default_entry_point() -> String {
    "TestExplicitGC".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            java: None,
            classpath: None,
            entry_point: default_entry_point(),
            base_flags: BASE_FLAGS.iter().map(|f| (*f).to_string()).collect(),
            timeout_secs: default_timeout_secs(),
            vm_opts_env: DEFAULT_VM_OPTS_ENV.to_string(),
            scenarios: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Launcher to run, resolving the default from `JAVA_HOME`.
    #[must_use]
    pub fn java_path(&self) -> String {
        if let Some(java) = &self.java {
            return java.clone();
        }
        match std::env::var_os("JAVA_HOME") {
            Some(home) if !home.is_empty() => PathBuf::from(home)
                .join("bin")
                .join("java")
                .to_string_lossy()
                .into_owned(),
            _ => "java".to_string(),
        }
    }

    /// Per-process timeout, `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Configured scenarios, or the built-in ones if none are configured.
    #[must_use]
    pub fn effective_scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            explicit_gc_scenarios()
        } else {
            self.scenarios.clone()
        }
    }

    /// Check for mistakes that would make results meaningless.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty entry point, duplicate
    /// scenario names, or a marker both required and forbidden.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_point.trim().is_empty() {
            return Err(ConfigError::Invalid("entry_point must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            let conflicts = scenario.patterns.conflicts();
            if !conflicts.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "scenario '{}' both requires and forbids {conflicts:?}",
                    scenario.name
                )));
            }
        }
        Ok(())
    }
}
