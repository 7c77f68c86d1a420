//! Vector kernels shared by the solvers and eigen iterations.

pub mod wrappers;
