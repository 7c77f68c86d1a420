//! Preconditioned Conjugate Gradient per Saad §9.2, for symmetric systems.
//!
//! Divisors are floored in magnitude to machine epsilon instead of failing, so an
//! indefinite or singular system runs to the iteration cap and reports its residual.

use crate::core::wrappers::{axpy, dot, norm};
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, check_dims, residual, residual_ratio};
use crate::utils::convergence::ConvergenceTracker;

#[derive(Debug, Default, Clone, Copy)]
pub struct CgSolver;

impl CgSolver {
    pub fn new() -> Self {
        CgSolver
    }
}

/// Keep the sign of `v` but never let its magnitude drop below machine epsilon.
pub(crate) fn floor_magnitude(v: f64) -> f64 {
    if v.abs() < f64::EPSILON { f64::EPSILON.copysign(v) } else { v }
}

impl LinearSolver for CgSolver {
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
        let mut r = vec![0.0; n];
        residual(a, x, b, &mut r);
        if tracker.update(0, residual_ratio(norm(&r), a_norm, x, b_norm)) {
            return Ok(());
        }
        let mut z = vec![0.0; n];
        let mut p = vec![0.0; n];
        let mut q = vec![0.0; n];
        let mut rho_prev = 0.0;
        for i in 0..tracker.max_iters() {
            pc.apply(&r, &mut z)?;
            let rho = dot(&r, &z);
            if i == 0 {
                p.copy_from_slice(&z);
            } else {
                let beta = rho / floor_magnitude(rho_prev);
                for (pj, zj) in p.iter_mut().zip(&z) {
                    *pj = beta * *pj + zj;
                }
            }
            a.multiply(&p, &mut q);
            let alpha = rho / floor_magnitude(dot(&p, &q));
            axpy(alpha, &p, x);
            axpy(-alpha, &q, &mut r);
            rho_prev = rho;
            if tracker.update(i + 1, residual_ratio(norm(&r), a_norm, x, b_norm)) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseRowMatrix;
    use crate::preconditioner::{Identity, Jacobi};
    use crate::utils::convergence::Convergence;

    fn run(a: &SparseRowMatrix, pc: &dyn Preconditioner, b: &[f64], tol: f64) -> (Vec<f64>, usize, bool) {
        let mut x = vec![0.0; b.len()];
        let mut tracker = ConvergenceTracker::new("cg", Convergence { tol, max_iters: 100 }, 0);
        CgSolver::new().solve(a, pc, b, &mut x, &mut tracker).unwrap();
        let stats = tracker.finish();
        (x, stats.iterations, stats.converged)
    }

    #[test]
    fn cg_solves_simple_spd() {
        // SPD system: [[4,1],[1,3]] x = [1,2]
        let a = SparseRowMatrix::from_triplets(2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)]).unwrap();
        let (x, _, converged) = run(&a, &Identity, &[1.0, 2.0], 1e-12);
        let expected = vec![0.09090909090909091, 0.6363636363636364];
        let tol = 1e-8;
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < tol, "xi = {}, expected = {}", xi, ei);
        }
        assert!(converged, "CG did not converge");
    }

    #[test]
    fn jacobi_on_diagonal_takes_one_iteration() {
        let a = SparseRowMatrix::from_diagonal(&[2.0, 5.0, 10.0, 0.5]);
        let pc = Jacobi::from_diagonal(&[2.0, 5.0, 10.0, 0.5]);
        let (x, iterations, converged) = run(&a, &pc, &[2.0, 5.0, 10.0, 0.5], 1e-12);
        assert!(converged);
        assert_eq!(iterations, 1);
        for xi in x {
            assert!((xi - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn floor_keeps_sign() {
        assert_eq!(floor_magnitude(-0.0), -f64::EPSILON);
        assert_eq!(floor_magnitude(1e-300), f64::EPSILON);
        assert_eq!(floor_magnitude(-2.0), -2.0);
    }
}
