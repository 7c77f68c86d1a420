//! fesolve: preconditioned Krylov and eigenvalue solvers for assembled FE systems
//!
//! This crate provides the numerical core shared by finite-element physics solvers:
//! iterative sparse linear solvers (CG, restarted GMRES) with Jacobi/Block-Jacobi
//! preconditioning, and generalized eigenvalue solvers (Lanczos, Arnoldi,
//! Rayleigh-quotient iteration) for the pencil `K·v = λ·M·v`.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod eigen;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use eigen::*;
pub use error::*;
pub use matrix::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
