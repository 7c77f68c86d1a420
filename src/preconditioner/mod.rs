//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and the Jacobi and Block-Jacobi
//! implementations. A preconditioner is set up once from a frozen matrix and is
//! immutable afterwards, so `apply` may be called from any thread.

use crate::error::KError;
use crate::matrix::SparseMatrix;

/// A preconditioner P ≈ A⁻¹.
pub trait Preconditioner: Send + Sync {
    /// Apply P to r, writing z = P r
    fn apply(&self, r: &[f64], z: &mut [f64]) -> Result<(), KError>;
    /// Setup/factorize from A
    fn setup(&mut self, _a: &dyn SparseMatrix) -> Result<(), KError> { Ok(()) }
}

/// Identity preconditioner (no preconditioning).
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Preconditioner for Identity {
    fn apply(&self, r: &[f64], z: &mut [f64]) -> Result<(), KError> {
        z.copy_from_slice(r);
        Ok(())
    }
}

// Submodules for various preconditioners
pub mod block_jacobi;
pub mod jacobi;

// Re-exports for convenience
pub use block_jacobi::BlockJacobi;
pub use jacobi::Jacobi;

/// Preconditioner kinds and their factory.
pub use crate::context::pc_context::{PcContext, PcType};
