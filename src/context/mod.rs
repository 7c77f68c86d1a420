//! Context module for the fesolve solver stack.
//!
//! Contexts encapsulate algorithm selection and parameter management, and build the
//! solver/preconditioner pipeline at solve time.
//!
//! Modules:
//! - [`ksp_context`]: `KspContext`, the linear solver factory (CG, GMRES) with equation scaling.
//! - [`pc_context`]: preconditioner selection (none, Jacobi, Block-Jacobi).
//! - [`eig_context`]: `EigenContext`, the generalized eigenvalue solver factory.
//!
//! # Example
//! ```rust,ignore
//! use fesolve::context::KspContext;
//! let mut ksp = KspContext::new().with_tol(1e-12);
//! let stats = ksp.solve(&a, &b, &mut x)?;
//! ```
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - PETSc documentation: https://petsc.org/release/docs/manualpages/KSP/

pub mod eig_context;
pub mod ksp_context;
pub mod pc_context;

pub use eig_context::EigenContext;
pub use ksp_context::{KspContext, SolverType, equation_scale};
pub use pc_context::{PcContext, PcType};
