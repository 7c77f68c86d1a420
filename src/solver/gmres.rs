//! Generalized Minimal Residual (GMRES) solver with fixed restart (Saad §6.4)
//!
//! Restarted GMRES for general (nonsymmetric) systems, right-preconditioned: the
//! preconditioner is applied before every multiplication by A and the stored
//! preconditioned basis is used to update the solution, so the minimized residual
//! is the true residual of the original system.
//!
//! # Features
//! - Modified Gram-Schmidt Arnoldi process
//! - Incremental Givens rotations for the least-squares problem
//! - Early exit of a cycle once the residual dropped by `INNER_REDUCTION`
//! - Happy breakdown detection
//! - Back-substitution with zero-pivot protection
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.4
//! - https://en.wikipedia.org/wiki/Generalized_minimal_residual_method

use crate::core::wrappers::{axpy, dot, norm, scale};
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, check_dims, residual, residual_ratio};
use crate::utils::convergence::ConvergenceTracker;

/// A restart cycle stops once the rotated residual fell below this fraction of ‖r₀‖.
pub const INNER_REDUCTION: f64 = 1e-4;

const EPSILON: f64 = 1e-14;

/// GMRES solver with a fixed Krylov dimension per restart cycle.
#[derive(Debug, Clone, Copy)]
pub struct GmresSolver {
    /// Number of Arnoldi vectors before restart
    pub restart: usize,
}

impl GmresSolver {
    pub fn new(restart: usize) -> Self {
        Self { restart: restart.max(1) }
    }

    /// Apply previous Givens rotations to column `j` of H, compute the new one, and update g.
    fn apply_givens_and_update_g(h: &mut [Vec<f64>], g: &mut [f64], cs: &mut [f64], sn: &mut [f64], j: usize) {
        for i in 0..j {
            let temp = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
            h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
            h[i][j] = temp;
        }
        let h_kk = h[j][j];
        let h_k1k = h[j + 1][j];
        let r = h_kk.hypot(h_k1k);
        if r < EPSILON {
            cs[j] = 1.0;
            sn[j] = 0.0;
        } else {
            cs[j] = h_kk / r;
            sn[j] = h_k1k / r;
        }
        h[j][j] = cs[j] * h_kk + sn[j] * h_k1k;
        h[j + 1][j] = 0.0;
        let temp = cs[j] * g[j] + sn[j] * g[j + 1];
        g[j + 1] = -sn[j] * g[j] + cs[j] * g[j + 1];
        g[j] = temp;
    }

    /// Solve upper-triangular system Hy = g for y, with zero-pivot protection.
    fn back_substitution(h: &[Vec<f64>], g: &[f64], y: &mut [f64], m: usize) {
        for i in (0..m).rev() {
            y[i] = g[i];
            for j in (i + 1)..m {
                y[i] -= h[i][j] * y[j];
            }
            if h[i][i].abs() > EPSILON {
                y[i] /= h[i][i];
            } else {
                y[i] = 0.0;
            }
        }
    }

    /// One restart cycle from the residual `r0` (with ‖r0‖ = `beta` > 0); updates `x`.
    /// Returns the number of Arnoldi steps taken.
    fn cycle(
        &self,
        a: &dyn SparseMatrix,
        pc: &dyn Preconditioner,
        r0: &[f64],
        beta: f64,
        a_norm: f64,
        x: &mut [f64],
    ) -> Result<usize, KError> {
        let n = r0.len();
        let m = self.restart;
        let mut v_basis: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
        let mut z_basis: Vec<Vec<f64>> = Vec::with_capacity(m);
        v_basis.push(r0.iter().map(|&ri| ri / beta).collect());

        let mut h = vec![vec![0.0; m]; m + 1];
        let mut g = vec![0.0; m + 1];
        g[0] = beta;
        let mut cs = vec![0.0; m];
        let mut sn = vec![0.0; m];
        let mut steps = 0;
        for j in 0..m {
            let mut z = vec![0.0; n];
            pc.apply(&v_basis[j], &mut z)?;
            let mut w = vec![0.0; n];
            a.multiply(&z, &mut w);
            z_basis.push(z);
            // Modified Gram-Schmidt
            for i in 0..=j {
                h[i][j] = dot(&w, &v_basis[i]);
                axpy(-h[i][j], &v_basis[i], &mut w);
            }
            let h_next = norm(&w);
            h[j + 1][j] = h_next;
            Self::apply_givens_and_update_g(&mut h, &mut g, &mut cs, &mut sn, j);
            steps = j + 1;
            if h_next <= EPSILON * a_norm.max(1.0) {
                break;
            }
            if g[j + 1].abs() < beta * INNER_REDUCTION {
                break;
            }
            scale(1.0 / h_next, &mut w);
            v_basis.push(w);
        }
        let mut y = vec![0.0; steps];
        Self::back_substitution(&h, &g, &mut y, steps);
        for (yi, zi) in y.iter().zip(&z_basis) {
            axpy(*yi, zi, x);
        }
        Ok(steps)
    }
}

impl LinearSolver for GmresSolver {
    /// Solve the linear system Ax = b using restarted GMRES.
    ///
    /// The tracker counts restart cycles: each outer iteration recomputes the true
    /// residual, checks it against the threshold, and runs one cycle.
    fn solve(
        &mut self,
        a: &dyn SparseMatrix,
        pc: &dyn Preconditioner,
        b: &[f64],
        x: &mut [f64],
        tracker: &mut ConvergenceTracker<'_>,
    ) -> Result<(), KError> {
        let n = check_dims(a, b, x)?;
        let a_norm = a.norm();
        let b_norm = norm(b);
        let mut r0 = vec![0.0; n];
        let mut outer = 0;
        loop {
            residual(a, x, b, &mut r0);
            let beta = norm(&r0);
            if tracker.update(outer, residual_ratio(beta, a_norm, x, b_norm)) || tracker.exhausted() || beta == 0.0 {
                break;
            }
            self.cycle(a, pc, &r0, beta, a_norm, x)?;
            outer += 1;
        }
        Ok(())
    }
}
