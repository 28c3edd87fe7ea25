//! Scenario definitions, lifecycle, and the driver that runs them.

mod driver;
mod report;
mod state;
mod types;

pub use driver::*;
pub use report::*;
pub use state::*;
pub use types::*;
