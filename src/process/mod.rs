//! Child process launching and output capture.

mod error;
mod launch;
mod output;
mod runner;

pub use error::*;
pub use launch::*;
pub use output::*;
pub use runner::*;
