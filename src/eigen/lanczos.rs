//! Lanczos tridiagonalization of `K⁻¹M` for symmetric pencils.
//!
//! Three-term recurrence from a random unit start vector; every step applies `K⁻¹`
//! through an inner CG solve. After `n_eig` steps the tridiagonal (d, e) is
//! diagonalized by implicit-shift QL, accumulating the rotations into the Lanczos
//! basis so the Ritz vectors come out alongside the Ritz values.

use faer::Mat;

use crate::context::ksp_context::SolverType;
use crate::core::wrappers::{axpy, dot, norm, scale};
use crate::eigen::ql::ql_implicit;
use crate::eigen::{EigenMethod, EigenSettings, EigenSolution, random_unit};
use crate::error::KError;
use crate::matrix::{DenseMatrix, SparseMatrix};

/// Ritz values θ ≈ 1/λ and Ritz vectors (rows) of the pencil (M, K).
pub fn lanczos(m: &dyn SparseMatrix, k: &dyn SparseMatrix, settings: &EigenSettings) -> Result<EigenSolution, KError> {
    let n = k.rows();
    let steps = settings.n_eig.min(n);
    let mut rng = settings.rng();
    let mut v = random_unit(n, &mut rng)?;
    let mut v_old = vec![0.0; n];
    let mut d = vec![0.0; steps];
    let mut e = vec![0.0; steps];
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(steps);
    let mut mv = vec![0.0; n];
    let mut beta = 0.0;
    for i in 0..steps {
        m.multiply(&v, &mut mv);
        let mut w = settings.inner_solve(SolverType::Cg, k, &mv, EigenMethod::Lanczos)?;
        axpy(-beta, &v_old, &mut w);
        d[i] = dot(&w, &v);
        axpy(-d[i], &v, &mut w);
        if i + 1 < steps {
            beta = norm(&w);
            if beta <= f64::EPSILON * d[i].abs() || !beta.is_finite() {
                return Err(KError::Numerical(format!("lanczos: breakdown at step {i} (beta={beta:e})")));
            }
            e[i] = beta;
            scale(1.0 / beta, &mut w);
            basis.push(std::mem::replace(&mut v, w));
            v_old.copy_from_slice(&basis[i]);
        } else {
            basis.push(std::mem::take(&mut v));
        }
    }
    log::debug!("lanczos: {steps} steps, tridiagonal diag={d:?}");

    // Ritz vectors: columns of (basis · Z); QL rotates the basis directly.
    let mut z = Mat::<f64>::from_columns(n, &basis);
    ql_implicit(&mut d, &mut e, Some(&mut z)).map_err(|err| err.within(EigenMethod::Lanczos.name()))?;
    let vectors = Mat::from_fn(steps, n, |r, c| z[(c, r)]);
    Ok(EigenSolution { method: EigenMethod::Lanczos, eigenvalues: d, eigenvectors: vectors })
}
