//! Solver configuration: plain option structs parsed into typed contexts.

pub mod options;
pub use options::{EigenOptions, KspOptions, PcOptions};
