//! Arnoldi projection of `K⁻¹M` for general pencils.
//!
//! Builds an orthonormal basis Qa and the upper-Hessenberg projection H column by
//! column (classical Gram-Schmidt), then reduces H with the Gram-Schmidt QR
//! iteration. Eigenvectors are the rows of transpose(Qa·Qq).

use faer::Mat;

use crate::context::ksp_context::SolverType;
use crate::core::wrappers::{axpy, dot, norm, scale};
use crate::eigen::qr::{dependence_floor, qr_gram_schmidt};
use crate::eigen::{EigenMethod, EigenSettings, EigenSolution, random_unit};
use crate::error::KError;
use crate::matrix::{DenseMatrix, SparseMatrix};

/// Hessenberg projection and its orthonormal basis (columns).
pub struct ArnoldiBasis {
    pub h: Mat<f64>,
    pub q: Vec<Vec<f64>>,
}

/// Run `dim` Arnoldi steps on `K⁻¹M`.
pub fn arnoldi_basis(
    m: &dyn SparseMatrix,
    k: &dyn SparseMatrix,
    dim: usize,
    settings: &EigenSettings,
) -> Result<ArnoldiBasis, KError> {
    let n = k.rows();
    let mut rng = settings.rng();
    let mut q: Vec<Vec<f64>> = Vec::with_capacity(dim);
    q.push(random_unit(n, &mut rng)?);
    let mut h = Mat::<f64>::zeros(dim, dim);
    let mut mq = vec![0.0; n];
    for j in 0..dim {
        m.multiply(&q[j], &mut mq);
        let mut w = settings.inner_solve(SolverType::Gmres, k, &mq, EigenMethod::Arnoldi)?;
        let w_norm = norm(&w);
        // classical Gram-Schmidt: all coefficients from the unmodified vector
        let coeffs: Vec<f64> = q.iter().map(|qi| dot(&w, qi)).collect();
        for (i, (c, qi)) in coeffs.iter().zip(&q).enumerate() {
            h[(i, j)] = *c;
            axpy(-c, qi, &mut w);
        }
        if j + 1 < dim {
            let nrm = norm(&w);
            if nrm <= dependence_floor(w_norm, n) || !nrm.is_finite() {
                return Err(KError::Numerical(format!("arnoldi: zero basis vector at column {}", j + 1)));
            }
            h[(j + 1, j)] = nrm;
            scale(1.0 / nrm, &mut w);
            q.push(w);
        }
    }
    Ok(ArnoldiBasis { h, q })
}

/// Ritz values θ ≈ 1/λ and eigenvectors (rows) of the pencil (M, K).
pub fn arnoldi(m: &dyn SparseMatrix, k: &dyn SparseMatrix, settings: &EigenSettings) -> Result<EigenSolution, KError> {
    let n = k.rows();
    let dim = settings.n_eig.min(n);
    let basis = arnoldi_basis(m, k, dim, settings)?;
    let qr = qr_gram_schmidt(&basis.h, settings.max_iters, settings.tol)
        .map_err(|err| err.within(EigenMethod::Arnoldi.name()))?;
    log::debug!("arnoldi: QR finished after {} sweeps (converged={})", qr.iterations, qr.converged);
    let qa = Mat::<f64>::from_columns(n, &basis.q);
    let ritz = &qa * &qr.eigenvectors;
    let vectors = Mat::from_fn(dim, n, |r, c| ritz[(c, r)]);
    Ok(EigenSolution { method: EigenMethod::Arnoldi, eigenvalues: qr.eigenvalues, eigenvectors: vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseRowMatrix;

    #[test]
    fn basis_is_orthonormal_and_projects() {
        let m = SparseRowMatrix::identity(5);
        let k = SparseRowMatrix::from_diagonal(&[1.0, 2.0, 4.0, 5.0, 10.0]);
        let out = arnoldi_basis(&m, &k, 3, &EigenSettings::default()).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot(&out.q[i], &out.q[j]) - expected).abs() < 1e-12);
            }
        }
        // H[i][j] = q_i · K⁻¹M q_j
        let kinv = [1.0, 0.5, 0.25, 0.2, 0.1];
        for i in 0..3 {
            for j in 0..3 {
                let proj: f64 = (0..5).map(|p| out.q[i][p] * kinv[p] * out.q[j][p]).sum();
                assert!((out.h[(i, j)] - proj).abs() < 1e-10);
            }
        }
    }
}
