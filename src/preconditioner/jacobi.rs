// Jacobi preconditioner implementation

use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;

/// Jacobi preconditioner: P = D⁻¹, with zero rows of D mapped to zero.
#[derive(Debug, Clone)]
pub struct Jacobi {
    pub(crate) inv_diag: Vec<f64>,
}

impl Jacobi {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }

    /// Build directly from a diagonal.
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let inv_diag = diag.iter().map(|&d| if d != 0.0 { 1.0 / d } else { 0.0 }).collect();
        Self { inv_diag }
    }
}

impl Default for Jacobi {
    fn default() -> Self {
        Self::new()
    }
}

impl Preconditioner for Jacobi {
    fn setup(&mut self, a: &dyn SparseMatrix) -> Result<(), KError> {
        let diag: Vec<f64> = (0..a.rows()).map(|i| a.diagonal(i)).collect();
        *self = Self::from_diagonal(&diag);
        Ok(())
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) -> Result<(), KError> {
        let n = self.inv_diag.len();
        if x.len() != n || y.len() != n {
            return Err(KError::DimensionMismatch { expected: n, found: if x.len() != n { x.len() } else { y.len() } });
        }
        for ((yi, &xi), &di) in y.iter_mut().zip(x).zip(&self.inv_diag) {
            *yi = di * xi;
        }
        Ok(())
    }
}
