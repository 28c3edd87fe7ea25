//! Scenario definitions and the built-in explicit-GC scenarios.

use serde::{Deserialize, Serialize};

use crate::analyzer::{Expectation, PatternSet, Stream};
use crate::simulate::Mode;

/// Marker logged by a stop-the-world full collection.
pub const FULL_MARKER: &str = "Pause Full";

/// Markers logged by a concurrent Shenandoah cycle.
pub const CONCURRENT_MARKERS: [&str; 2] = ["Pause Init Mark", "Pause Final Mark"];

/// Flags shared by every built-in scenario.
pub const BASE_FLAGS: [&str; 4] = [
    "-Xmx128m",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+UseShenandoahGC",
    "-Xlog:gc",
];

/// One flag combination and what its output must (not) contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Flag added after the base flags; `None` runs the base flags alone.
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(flatten)]
    pub patterns: PatternSet,
    #[serde(default)]
    pub stream: Stream,
    #[serde(default)]
    pub expected_exit: Option<i32>,
}

fn default_mode() -> Mode {
    Mode::RequestCollection
}

impl Scenario {
    /// Create a scenario that requests a collection and checks stdout.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            flag: None,
            mode: default_mode(),
            patterns: PatternSet::default(),
            stream: Stream::default(),
            expected_exit: None,
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn expect_exit(mut self, code: i32) -> Self {
        self.expected_exit = Some(code);
        self
    }

    /// Everything the output is checked against: exit value first, then markers.
    #[must_use]
    pub fn expectations(&self) -> Vec<Expectation> {
        self.expected_exit
            .map(Expectation::ExitValue)
            .into_iter()
            .chain(self.patterns.expectations())
            .collect()
    }
}

/// The four explicit-GC scenarios.
///
/// Each requests a collection and checks which pause markers appear. All of
/// them also require a clean exit, so a JVM that refuses the flags cannot
/// pass the scenarios that only forbid markers.
#[must_use]
pub fn explicit_gc_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("default")
            .describe("Explicit GC runs a concurrent cycle by default")
            .patterns(
                PatternSet::new()
                    .require(CONCURRENT_MARKERS)
                    .forbid([FULL_MARKER]),
            )
            .expect_exit(0),
        Scenario::new("disable-explicit-gc")
            .describe("DisableExplicitGC ignores the request")
            .flag("-XX:+DisableExplicitGC")
            .patterns(
                PatternSet::new()
                    .forbid(CONCURRENT_MARKERS)
                    .forbid([FULL_MARKER]),
            )
            .expect_exit(0),
        Scenario::new("explicit-gc-invokes-concurrent")
            .describe("ExplicitGCInvokesConcurrent runs a concurrent cycle")
            .flag("-XX:+ExplicitGCInvokesConcurrent")
            .patterns(
                PatternSet::new()
                    .require(CONCURRENT_MARKERS)
                    .forbid([FULL_MARKER]),
            )
            .expect_exit(0),
        Scenario::new("explicit-gc-full")
            .describe("-ExplicitGCInvokesConcurrent runs a full collection")
            .flag("-XX:-ExplicitGCInvokesConcurrent")
            .patterns(
                PatternSet::new()
                    .require([FULL_MARKER])
                    .forbid(CONCURRENT_MARKERS),
            )
            .expect_exit(0),
    ]
}
