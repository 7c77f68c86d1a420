//! Dense LU factorization of small blocks, using Faer.
//!
//! Block-Jacobi factors every diagonal block once at setup and then solves against the
//! cached factorization on every preconditioner application. A singular block is not
//! detected here: the solve propagates whatever the factorization produces.
//!
//! # References
//! - Faer documentation: https://github.com/sarah-ek/faer-rs
//! - Golub & Van Loan, Matrix Computations

use crate::error::KError;
use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::{Conj, Mat, MatMut};

/// LU solver using full pivoting from Faer.
///
/// Stores the LU factorization for reuse.
pub struct LuSolver {
    /// Cached LU factorization (if computed)
    factor: Option<FullPivLu<f64>>,
    dim: usize,
}

impl LuSolver {
    /// Create a new LU solver (no factorization yet).
    pub fn new() -> Self {
        LuSolver { factor: None, dim: 0 }
    }

    /// Compute and cache the factorization of `a`.
    pub fn factor(&mut self, a: &Mat<f64>) {
        self.dim = a.nrows();
        self.factor = Some(FullPivLu::new(a.as_ref()));
    }

    /// Solve using the cached LU factorization.
    ///
    /// # Arguments
    /// * `b` - Right-hand side vector
    /// * `x` - Output vector (solution)
    pub fn solve_cached(&self, b: &[f64], x: &mut [f64]) -> Result<(), KError> {
        let factor = self
            .factor
            .as_ref()
            .ok_or_else(|| KError::Configuration("LU solve requested before factorization".to_string()))?;
        if b.len() != self.dim || x.len() != self.dim {
            return Err(KError::DimensionMismatch { expected: self.dim, found: b.len() });
        }
        let n = b.len();
        x.copy_from_slice(b);
        let x_mat = MatMut::from_column_major_slice_mut(x, n, 1);
        factor.solve_in_place_with_conj(Conj::No, x_mat);
        Ok(())
    }
}

impl Default for LuSolver {
    fn default() -> Self {
        Self::new()
    }
}
