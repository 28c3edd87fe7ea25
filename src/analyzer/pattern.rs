//! Marker sets and individual expectations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One thing a captured output is expected to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Expectation {
    /// The literal marker must appear.
    Contains(String),
    /// The literal marker must not appear.
    NotContains(String),
    /// The regular expression must match somewhere.
    Matches(String),
    /// The process must have exited with this code.
    ExitValue(i32),
}

/// Broad class of an [`Expectation`], used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    Required,
    Forbidden,
    Matches,
    ExitValue,
}

impl Expectation {
    #[must_use]
    pub fn kind(&self) -> ExpectationKind {
        match self {
            Self::Contains(_) => ExpectationKind::Required,
            Self::NotContains(_) => ExpectationKind::Forbidden,
            Self::Matches(_) => ExpectationKind::Matches,
            Self::ExitValue(_) => ExpectationKind::ExitValue,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(m) => write!(f, "should contain '{m}'"),
            Self::NotContains(m) => write!(f, "should not contain '{m}'"),
            Self::Matches(p) => write!(f, "should match /{p}/"),
            Self::ExitValue(c) => write!(f, "should have exit value {c}"),
        }
    }
}

/// Markers that must and must not appear in one scenario's output.
///
/// Markers are literal, case-sensitive substrings and carry no ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    /// Markers that must appear.
    pub required: Vec<String>,
    /// Markers that must not appear.
    pub forbidden: Vec<String>,
}

impl PatternSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add markers that must appear.
    #[must_use]
    pub fn require<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(markers.into_iter().map(Into::into));
        self
    }

    /// Add markers that must not appear.
    #[must_use]
    pub fn forbid<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden.extend(markers.into_iter().map(Into::into));
        self
    }

    /// Markers listed as both required and forbidden.
    #[must_use]
    pub fn conflicts(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|m| self.forbidden.contains(m))
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    /// Every marker as an expectation, required markers first.
    #[must_use]
    pub fn expectations(&self) -> Vec<Expectation> {
        self.required
            .iter()
            .cloned()
            .map(Expectation::Contains)
            .chain(self.forbidden.iter().cloned().map(Expectation::NotContains))
            .collect()
    }
}
