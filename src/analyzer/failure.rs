//! Assertion failure reporting.

use std::fmt;

use serde::Serialize;

use super::{Expectation, ExpectationKind, Stream};
use crate::process::CapturedOutput;

/// Position of a marker inside captured text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Byte offset from the start of the text.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
}

impl Location {
    /// Locate a byte offset within `text`.
    ///
    /// `offset` must lie on a char boundary, as returned by `str::find`.
    #[must_use]
    pub(crate) fn at(text: &str, offset: usize) -> Self {
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A single violated expectation.
///
/// Carries a snapshot of the output it was checked against so the failure
/// can be reported on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    pub expectation: Expectation,
    pub stream: Stream,
    /// First occurrence of a forbidden marker.
    pub location: Option<Location>,
    /// Extra context, such as a regex compile error.
    pub detail: Option<String>,
    #[serde(skip)]
    pub output: CapturedOutput,
}

impl AssertionFailure {
    #[must_use]
    pub fn kind(&self) -> ExpectationKind {
        self.expectation.kind()
    }

    /// The marker, pattern or exit code that was violated.
    #[must_use]
    pub fn subject(&self) -> String {
        match &self.expectation {
            Expectation::Contains(m) | Expectation::NotContains(m) | Expectation::Matches(m) => {
                m.clone()
            }
            Expectation::ExitValue(c) => c.to_string(),
        }
    }

    /// One-line description without the output dump.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = match &self.expectation {
            Expectation::Contains(m) => format!("'{m}' missing from {}", self.stream),
            Expectation::NotContains(m) => format!("'{m}' found in {}", self.stream),
            Expectation::Matches(p) => format!("no match for /{p}/ in {}", self.stream),
            Expectation::ExitValue(c) => match self.output.exit_code() {
                Some(actual) => format!("expected exit value {c}, got {actual}"),
                None => format!("expected exit value {c}, process was killed by a signal"),
            },
        };
        if let Some(loc) = self.location {
            line.push_str(&format!(" at {loc}"));
        }
        if let Some(detail) = &self.detail {
            line.push_str(&format!(" ({detail})"));
        }
        line
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        f.write_str(&super::diagnostic_summary(&self.output))
    }
}

impl std::error::Error for AssertionFailure {}

/// Every failure from one check pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violations {
    failures: Vec<AssertionFailure>,
}

impl Violations {
    /// Wrap a list of failures; `None` if there are none.
    #[must_use]
    pub fn from_failures(failures: Vec<AssertionFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether there are no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssertionFailure> {
        self.failures.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} assertion(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "  - {}", failure.summary())?;
        }
        // All failures of one pass share the same output.
        if let Some(first) = self.failures.first() {
            f.write_str(&super::diagnostic_summary(&first.output))?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = AssertionFailure;
    type IntoIter = std::vec::IntoIter<AssertionFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}
