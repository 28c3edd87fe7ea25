//! Colored CLI display utilities for harness output.
//!
//! This module provides functions for printing colored, formatted scenario
//! progress and results to the terminal.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::analyzer::diagnostic_summary;
use crate::process::RunError;
use crate::scenario::{RunReport, Scenario, ScenarioOutcome};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Maximum length for truncated display strings.
const DEFAULT_MAX_LEN: usize = 120;

/// Truncate a string to a maximum length in characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize, raw_mode: bool) -> String {
    if raw_mode || s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{kept}...")
}

/// Plain-text lines explaining why a scenario failed. Empty for a pass.
#[must_use]
pub fn failure_lines(outcome: &ScenarioOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &outcome.error {
        lines.push(error.to_string());
        match error {
            RunError::StreamDrain { partial, .. } if !partial.is_empty() => {
                lines.push(format!("partial output:\n{}", partial.trim_end()));
            }
            RunError::TimedOut { stdout, stderr, .. } => {
                lines.push(format!(
                    "partial stdout:\n{}\npartial stderr:\n{}",
                    stdout.trim_end(),
                    stderr.trim_end()
                ));
            }
            _ => {}
        }
    }
    if let Some(violations) = &outcome.violations {
        lines.extend(violations.iter().map(|f| f.summary()));
    }
    lines
}

/// Print that a scenario is starting.
pub fn print_scenario_start(name: &str, command: &str, raw_mode: bool) {
    println!(
        "{} {} {} {}",
        timestamp().dimmed(),
        "[RUN]".blue().bold(),
        name.cyan(),
        truncate(command, DEFAULT_MAX_LEN, raw_mode).dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print one scenario's result, with a diagnostic dump when it failed.
pub fn print_outcome(outcome: &ScenarioOutcome) {
    let elapsed = outcome
        .output
        .as_ref()
        .map_or(String::new(), |o| format!("({} ms)", o.elapsed().as_millis()));

    if outcome.passed() {
        println!(
            "{} {} {} {}",
            timestamp().dimmed(),
            "[PASS]".green().bold(),
            outcome.name,
            elapsed.dimmed()
        );
    } else {
        println!(
            "{} {} {} {}",
            timestamp().dimmed(),
            "[FAIL]".red().bold(),
            outcome.name,
            elapsed.dimmed()
        );
        for line in failure_lines(outcome) {
            println!("  {} {}", "-".red(), line);
        }
        if let Some(output) = &outcome.output {
            println!("{}", diagnostic_summary(output).dimmed());
        }
    }
    let _ = io::stdout().flush();
}

/// Print the final tally.
pub fn print_summary(report: &RunReport) {
    let passed = report.passed().count();
    let failed = report.failed().count();
    let tally = format!("{passed} passed, {failed} failed");
    if report.all_passed() {
        println!("{} {}", "[SUMMARY]".green().bold(), tally);
    } else {
        let names: Vec<&str> = report.failed().map(|o| o.name.as_str()).collect();
        println!(
            "{} {} ({})",
            "[SUMMARY]".red().bold(),
            tally,
            names.join(", ")
        );
    }
    let _ = io::stdout().flush();
}

/// Print a configured scenario and the command it would run.
pub fn print_scenario(scenario: &Scenario, command: &str) {
    println!("{} {}", scenario.name.cyan().bold(), scenario.description.dimmed());
    println!("    {command}");
    for marker in &scenario.patterns.required {
        println!("    {} {marker}", "+".green());
    }
    for marker in &scenario.patterns.forbidden {
        println!("    {} {marker}", "-".red());
    }
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analyzer::{OutputAnalyzer, PatternSet};
    use crate::process::CapturedOutput;
    use crate::scenario::ScenarioState;

    fn failed_outcome() -> ScenarioOutcome {
        let output = CapturedOutput::from_parts("GC(0) Pause Full\n", "", Some(0));
        let violations = OutputAnalyzer::new(&output)
            .check(&PatternSet::new().require(["Pause Init Mark"]).forbid(["Pause Full"]))
            .unwrap_err();
        let mut outcome = ScenarioOutcome::new("default", "java x".into());
        outcome.state = ScenarioState::Failed;
        outcome.violations = Some(violations);
        outcome.output = Some(output);
        outcome
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10, false), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8, false), "hello...");
    }

    #[test]
    fn test_truncate_very_short_max() {
        assert_eq!(truncate("hello", 3, false), "...");
        assert_eq!(truncate("hello", 0, false), "...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ééééé", 4, false), "é...");
    }

    #[test]
    fn test_truncate_raw_mode_no_truncation() {
        let long_string = "a".repeat(200);
        assert_eq!(truncate(&long_string, 10, true), long_string);
    }

    #[test]
    fn test_failure_lines_lists_violations() {
        let lines = failure_lines(&failed_outcome());
        assert_eq!(
            lines,
            vec![
                "'Pause Init Mark' missing from stdout",
                "'Pause Full' found in stdout at line 1, column 7",
            ]
        );
    }

    #[test]
    fn test_failure_lines_timeout_includes_partial_output() {
        let mut outcome = ScenarioOutcome::new("slow", "java x".into());
        outcome.state = ScenarioState::Failed;
        outcome.error = Some(RunError::TimedOut {
            after: Duration::from_secs(1),
            stdout: "started\n".into(),
            stderr: String::new(),
        });
        let lines = failure_lines(&outcome);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("started"));
    }

    #[test]
    fn test_failure_lines_empty_for_pass() {
        let mut outcome = ScenarioOutcome::new("ok", "java x".into());
        outcome.state = ScenarioState::Passed;
        assert!(failure_lines(&outcome).is_empty());
    }
}
