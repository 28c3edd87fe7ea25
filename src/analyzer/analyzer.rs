//! Assertions over captured process output.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{AssertionFailure, Expectation, Location, PatternSet, Violations};
use crate::process::CapturedOutput;

/// Which captured text an analyzer checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// Standard output, where `-Xlog` writes by default.
    #[default]
    Stdout,
    Stderr,
    /// Standard output followed directly by standard error, with no
    /// separator, so a marker may span the boundary.
    Combined,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::Combined => f.write_str("stdout+stderr"),
        }
    }
}

/// Checks a finished process's output against expectations.
///
/// Every assertion is independent and side-effect free: calling one never
/// changes the result of another, and repeating one gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct OutputAnalyzer<'a> {
    output: &'a CapturedOutput,
    stream: Stream,
}

impl<'a> OutputAnalyzer<'a> {
    /// Analyze standard output of `output`.
    #[must_use]
    pub fn new(output: &'a CapturedOutput) -> Self {
        Self {
            output,
            stream: Stream::Stdout,
        }
    }

    /// Check a different stream.
    #[must_use]
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn output(&self) -> &'a CapturedOutput {
        self.output
    }

    #[must_use]
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// The text assertions run against.
    #[must_use]
    pub fn text(&self) -> Cow<'a, str> {
        match self.stream {
            Stream::Stdout => Cow::Borrowed(self.output.stdout()),
            Stream::Stderr => Cow::Borrowed(self.output.stderr()),
            Stream::Combined => {
                Cow::Owned(format!("{}{}", self.output.stdout(), self.output.stderr()))
            }
        }
    }

    /// Succeeds iff `marker` occurs anywhere in the checked text.
    ///
    /// # Errors
    ///
    /// Returns an `AssertionFailure` naming the missing marker.
    pub fn should_contain(&self, marker: &str) -> Result<(), AssertionFailure> {
        if self.text().contains(marker) {
            Ok(())
        } else {
            Err(self.failure(Expectation::Contains(marker.to_string()), None, None))
        }
    }

    /// Succeeds iff `marker` occurs nowhere in the checked text.
    ///
    /// # Errors
    ///
    /// Returns an `AssertionFailure` naming the marker and where it first occurs.
    pub fn should_not_contain(&self, marker: &str) -> Result<(), AssertionFailure> {
        let text = self.text();
        match text.find(marker) {
            None => Ok(()),
            Some(offset) => Err(self.failure(
                Expectation::NotContains(marker.to_string()),
                Some(Location::at(&text, offset)),
                None,
            )),
        }
    }

    /// Succeeds iff the regular expression matches somewhere in the checked text.
    ///
    /// # Errors
    ///
    /// Returns an `AssertionFailure` if nothing matches or the pattern is invalid.
    pub fn should_match(&self, pattern: &str) -> Result<(), AssertionFailure> {
        let expectation = Expectation::Matches(pattern.to_string());
        match Regex::new(pattern) {
            Ok(re) if re.is_match(&self.text()) => Ok(()),
            Ok(_) => Err(self.failure(expectation, None, None)),
            Err(e) => Err(self.failure(expectation, None, Some(format!("invalid pattern: {e}")))),
        }
    }

    /// Succeeds iff the process exited with `code`.
    ///
    /// # Errors
    ///
    /// Returns an `AssertionFailure` if the code differs or the process was
    /// killed by a signal.
    pub fn should_have_exit_value(&self, code: i32) -> Result<(), AssertionFailure> {
        if self.output.exit_code() == Some(code) {
            Ok(())
        } else {
            Err(self.failure(Expectation::ExitValue(code), None, None))
        }
    }

    /// Evaluate one expectation.
    ///
    /// # Errors
    ///
    /// Returns the `AssertionFailure` if the expectation does not hold.
    pub fn evaluate(&self, expectation: &Expectation) -> Result<(), AssertionFailure> {
        match expectation {
            Expectation::Contains(m) => self.should_contain(m),
            Expectation::NotContains(m) => self.should_not_contain(m),
            Expectation::Matches(p) => self.should_match(p),
            Expectation::ExitValue(c) => self.should_have_exit_value(*c),
        }
    }

    /// Evaluate every expectation and report all that fail.
    ///
    /// # Errors
    ///
    /// Returns `Violations` holding one failure per unmet expectation.
    pub fn check_all<'e, I>(&self, expectations: I) -> Result<(), Violations>
    where
        I: IntoIterator<Item = &'e Expectation>,
    {
        let failures: Vec<AssertionFailure> = expectations
            .into_iter()
            .filter_map(|e| self.evaluate(e).err())
            .collect();
        match Violations::from_failures(failures) {
            None => Ok(()),
            Some(violations) => Err(violations),
        }
    }

    /// Evaluate a whole [`PatternSet`].
    ///
    /// # Errors
    ///
    /// Returns `Violations` for every required marker missing and every
    /// forbidden marker present.
    pub fn check(&self, patterns: &PatternSet) -> Result<(), Violations> {
        self.check_all(&patterns.expectations())
    }

    fn failure(
        &self,
        expectation: Expectation,
        location: Option<Location>,
        detail: Option<String>,
    ) -> AssertionFailure {
        tracing::debug!(stream = %self.stream, %expectation, "Assertion failed");
        AssertionFailure {
            expectation,
            stream: self.stream,
            location,
            detail,
            output: self.output.clone(),
        }
    }
}

/// Render an output's exit code and both streams for failure reports.
#[must_use]
pub fn diagnostic_summary(output: &CapturedOutput) -> String {
    let exit = output
        .exit_code()
        .map_or_else(|| "none (signal)".to_string(), |c| c.to_string());
    format!(
        "--- exit value: {exit}\n--- stdout ---\n{}\n--- stderr ---\n{}\n",
        output.stdout().trim_end(),
        output.stderr().trim_end()
    )
}
