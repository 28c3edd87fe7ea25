//! Pattern assertions over captured output.

#[allow(clippy::module_inception)]
mod analyzer;
mod failure;
mod pattern;

pub use analyzer::*;
pub use failure::*;
pub use pattern::*;
