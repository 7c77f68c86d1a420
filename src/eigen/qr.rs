//! Unshifted QR iteration with classical Gram-Schmidt factorization.
//!
//! Used on the small Hessenberg matrix produced by the Arnoldi process. Each sweep
//! factors the iterate `A = Q·R`, replaces it by `R·Q` and accumulates `V ← V·Q`.
//! The iteration stops once every entry below the diagonal of `A` is smaller than
//! the threshold; the diagonal then holds the eigenvalues and the columns of `V`
//! the corresponding (Schur) vectors.

use faer::Mat;

use crate::error::KError;
use crate::matrix::DenseMatrix;

#[derive(Debug, Clone)]
pub struct QrOutcome {
    pub eigenvalues: Vec<f64>,
    /// Column `j` pairs with `eigenvalues[j]`.
    pub eigenvectors: Mat<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Norm below which an orthogonalized vector of original norm `norm` is roundoff.
pub(crate) fn dependence_floor(norm: f64, n: usize) -> f64 {
    f64::EPSILON * n as f64 * norm
}

/// Classical Gram-Schmidt: returns (Q, R) with A = Q·R.
pub fn gram_schmidt(a: &Mat<f64>) -> Result<(Mat<f64>, Mat<f64>), KError> {
    let (rows, cols) = (a.nrows(), a.ncols());
    let mut q = Mat::<f64>::zeros(rows, cols);
    let mut r = Mat::<f64>::zeros(cols, cols);
    for j in 0..cols {
        let mut col: Vec<f64> = (0..rows).map(|i| a[(i, j)]).collect();
        let col_norm = col.iter().map(|c| c * c).sum::<f64>().sqrt();
        for p in 0..j {
            r[(p, j)] = (0..rows).map(|i| q[(i, p)] * a[(i, j)]).sum();
        }
        for p in 0..j {
            for (i, ci) in col.iter_mut().enumerate() {
                *ci -= r[(p, j)] * q[(i, p)];
            }
        }
        let nrm = col.iter().map(|c| c * c).sum::<f64>().sqrt();
        if nrm <= dependence_floor(col_norm, rows) || !nrm.is_finite() {
            return Err(KError::Numerical(format!(
                "QR: column {j} is dependent on the previous ones (norm {nrm:e} of {col_norm:e})"
            )));
        }
        r[(j, j)] = nrm;
        for (i, ci) in col.iter().enumerate() {
            q[(i, j)] = ci / nrm;
        }
    }
    Ok((q, r))
}

/// Iterate until the sub-diagonal part of the iterate drops below `threshold`
/// or `max_iter` sweeps have been done.
pub fn qr_gram_schmidt(h: &Mat<f64>, max_iter: usize, threshold: f64) -> Result<QrOutcome, KError> {
    let k = h.nrows();
    if h.ncols() != k {
        return Err(KError::DimensionMismatch { expected: k, found: h.ncols() });
    }
    let mut a = h.clone();
    let mut v: Option<Mat<f64>> = None;
    let mut iterations = 0;
    let mut converged = a.max_below_diagonal() < threshold;
    while !converged && iterations < max_iter {
        let (q, r) = gram_schmidt(&a)?;
        a = &r * &q;
        v = Some(match v {
            None => q,
            Some(v) => &v * &q,
        });
        iterations += 1;
        converged = a.max_below_diagonal() < threshold;
    }
    if !converged {
        log::warn!(
            "qr: sub-diagonal still {:.3e} after {} sweeps (threshold {:.3e})",
            a.max_below_diagonal(), iterations, threshold
        );
    }
    Ok(QrOutcome {
        eigenvalues: (0..k).map(|i| a[(i, i)]).collect(),
        eigenvectors: v.unwrap_or_else(|| Mat::identity(k, k)),
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorization_reproduces_input() {
        let a = Mat::from_fn(3, 3, |i, j| [[2.0, -1.0, 0.5], [1.0, 3.0, 0.0], [0.0, 0.7, 1.5]][i][j]);
        let (q, r) = gram_schmidt(&a).unwrap();
        let qr = &q * &r;
        for i in 0..3 {
            for j in 0..3 {
                assert!((qr[(i, j)] - a[(i, j)]).abs() < 1e-13);
                if i > j {
                    assert_eq!(r[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn singular_column_is_numerical_error() {
        let a = Mat::from_fn(2, 2, |_, j| if j == 0 { 1.0 } else { 2.0 });
        assert!(matches!(gram_schmidt(&a), Err(KError::Numerical(_))));
    }

    #[test]
    fn symmetric_tridiagonal_spectrum() {
        // eigenvalues 2 - sqrt(2), 2, 2 + sqrt(2)
        let h = Mat::from_fn(3, 3, |i, j| {
            if i == j { 2.0 } else if i.abs_diff(j) == 1 { -1.0 } else { 0.0 }
        });
        let out = qr_gram_schmidt(&h, 500, 1e-12).unwrap();
        assert!(out.converged);
        let mut ev = out.eigenvalues.clone();
        ev.sort_by(f64::total_cmp);
        let s = 2f64.sqrt();
        for (got, want) in ev.iter().zip([2.0 - s, 2.0, 2.0 + s]) {
            assert!((got - want).abs() < 1e-10);
        }
        // H v = λ v for every column of V
        for j in 0..3 {
            for i in 0..3 {
                let hv: f64 = (0..3).map(|p| h[(i, p)] * out.eigenvectors[(p, j)]).sum();
                assert!((hv - out.eigenvalues[j] * out.eigenvectors[(i, j)]).abs() < 1e-8);
            }
        }
    }
}
