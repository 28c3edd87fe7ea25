//! gc-harness - Verify a collector's response to explicit GC requests.

pub mod analyzer;
pub mod config;
pub mod display;
pub mod process;
pub mod scenario;
pub mod simulate;
