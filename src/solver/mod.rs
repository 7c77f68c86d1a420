//! Krylov solver interfaces.
//!
//! Solvers iterate on an already scaled system; equation scaling, preconditioner
//! construction and the convergence tracker's lifetime are handled by
//! [`KspContext`](crate::context::KspContext).

use crate::core::wrappers::norm;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::ConvergenceTracker;

/// Common interface for the iterative solvers.
pub trait LinearSolver {
    /// Solve A·x = b in place: `x` holds the initial guess on entry.
    /// Iteration counts and the residual ratio are recorded in `tracker`.
    fn solve(
        &mut self,
        a: &dyn SparseMatrix,
        pc: &dyn Preconditioner,
        b: &[f64],
        x: &mut [f64],
        tracker: &mut ConvergenceTracker<'_>,
    ) -> Result<(), KError>;
}

/// r ← b − A·x
pub fn residual(a: &dyn SparseMatrix, x: &[f64], b: &[f64], r: &mut [f64]) {
    a.multiply(x, r);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
}

/// Convergence metric ‖r‖/(‖A‖·‖x‖+‖b‖); falls back to ‖r‖ for a zero denominator.
pub fn residual_ratio(r_norm: f64, a_norm: f64, x: &[f64], b_norm: f64) -> f64 {
    let denom = a_norm * norm(x) + b_norm;
    if denom > 0.0 { r_norm / denom } else { r_norm }
}

pub(crate) fn check_dims(a: &dyn SparseMatrix, b: &[f64], x: &[f64]) -> Result<usize, KError> {
    let n = a.rows();
    if b.len() != n {
        return Err(KError::DimensionMismatch { expected: n, found: b.len() });
    }
    if x.len() != n {
        return Err(KError::DimensionMismatch { expected: n, found: x.len() });
    }
    Ok(n)
}

pub mod direct_lu;
pub use direct_lu::LuSolver;

pub mod cg;
pub use cg::CgSolver;

pub mod gmres;
pub use gmres::GmresSolver;
