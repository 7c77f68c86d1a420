//! Utilities shared by the iterative solvers.

pub mod convergence;
pub use convergence::{Convergence, ConvergenceTracker, ProgressSink};
