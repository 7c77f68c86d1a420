//! Implicit-shift QL for symmetric tridiagonal matrices.
//!
//! Input convention: `d[0..n)` is the diagonal and `e[i]` the sub-diagonal entry
//! between rows `i` and `i+1`, with `e[n-1] = 0`. On return `d` holds the eigenvalues
//! (unsorted) and `e` is destroyed. When `z` is given, every rotation is accumulated
//! into its columns: start from the identity to get the eigenvectors of the
//! tridiagonal matrix, or from an orthogonal basis to get them in that basis.

use faer::Mat;

use crate::error::KError;

/// Sweeps allowed per eigenvalue before giving up on it with a warning.
pub const MAX_QL_SWEEPS: usize = 30;

/// sqrt(a² + b²) without destructive underflow or overflow.
pub fn pythag(a: f64, b: f64) -> f64 {
    let absa = a.abs();
    let absb = b.abs();
    if absa > absb {
        let ratio = absb / absa;
        absa * (1.0 + ratio * ratio).sqrt()
    } else if absb == 0.0 {
        0.0
    } else {
        let ratio = absa / absb;
        absb * (1.0 + ratio * ratio).sqrt()
    }
}

/// Diagonalize the tridiagonal (d, e) in place. Returns the number of eigenvalues
/// that hit the sweep cap (0 on full success).
pub fn ql_implicit(d: &mut [f64], e: &mut [f64], mut z: Option<&mut Mat<f64>>) -> Result<usize, KError> {
    let n = d.len();
    if e.len() != n {
        return Err(KError::DimensionMismatch { expected: n, found: e.len() });
    }
    if let Some(z) = z.as_deref() {
        if z.ncols() != n {
            return Err(KError::DimensionMismatch { expected: n, found: z.ncols() });
        }
    }
    if n == 0 {
        return Ok(0);
    }
    e[n - 1] = 0.0;
    let mut stalled = 0;
    for l in 0..n {
        let mut sweeps = 0;
        loop {
            let mut m = l;
            while m < n - 1 {
                let dd = d[m].abs() + d[m + 1].abs();
                if e[m].abs() + dd == dd {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }
            if sweeps == MAX_QL_SWEEPS {
                log::warn!("ql: eigenvalue {l} not isolated after {MAX_QL_SWEEPS} sweeps");
                stalled += 1;
                break;
            }
            sweeps += 1;

            // Wilkinson shift
            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = pythag(g, 1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut underflow = false;
            for i in (l..m).rev() {
                let f = s * e[i];
                let b = c * e[i];
                r = pythag(f, g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
                if let Some(z) = z.as_deref_mut() {
                    for k in 0..z.nrows() {
                        let f = z[(k, i + 1)];
                        z[(k, i + 1)] = s * z[(k, i)] + c * f;
                        z[(k, i)] = c * z[(k, i)] - s * f;
                    }
                }
            }
            if underflow {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }
    Ok(stalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn pythag_matches_hypot() {
        assert_eq!(pythag(3.0, 4.0), 5.0);
        assert_eq!(pythag(0.0, 0.0), 0.0);
        assert!((pythag(1e300, 1e300) - 1e300 * 2f64.sqrt()).abs() / 1e300 < 1e-15);
    }

    #[test]
    fn discrete_laplacian_eigenvalues() {
        let n = 12;
        let mut d = vec![2.0; n];
        let mut e = vec![-1.0; n];
        e[n - 1] = 0.0;
        assert_eq!(ql_implicit(&mut d, &mut e, None).unwrap(), 0);
        d.sort_by(f64::total_cmp);
        for (k, dk) in d.iter().enumerate() {
            let exact = 2.0 - 2.0 * ((k + 1) as f64 * PI / (n + 1) as f64).cos();
            assert!(((dk - exact) / exact).abs() < 1e-8, "k={k}: {dk} vs {exact}");
        }
    }

    #[test]
    fn accumulated_vectors_are_eigenvectors() {
        let diag = [4.0, 1.0, 3.0, -2.0, 0.5];
        let off = [1.0, 0.5, -2.0, 0.25];
        let n = diag.len();
        let mut d = diag.to_vec();
        let mut e = off.to_vec();
        e.push(0.0);
        let mut z = Mat::<f64>::identity(n, n);
        ql_implicit(&mut d, &mut e, Some(&mut z)).unwrap();
        for j in 0..n {
            for i in 0..n {
                let mut tz = diag[i] * z[(i, j)];
                if i > 0 {
                    tz += off[i - 1] * z[(i - 1, j)];
                }
                if i + 1 < n {
                    tz += off[i] * z[(i + 1, j)];
                }
                assert!((tz - d[j] * z[(i, j)]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn sweep_cap_reports_stalled_eigenvalues() {
        // a NaN never passes the negligibility test, so every sweep is spent
        let mut d = vec![f64::NAN, 1.0, 2.0];
        let mut e = vec![1.0, 1.0, 0.0];
        let stalled = ql_implicit(&mut d, &mut e, None).unwrap();
        assert_eq!(stalled, 2);
    }

    #[test]
    fn already_diagonal_is_untouched() {
        let mut d = vec![3.0, 1.0, 2.0];
        let mut e = vec![0.0; 3];
        ql_implicit(&mut d, &mut e, None).unwrap();
        assert_eq!(d, vec![3.0, 1.0, 2.0]);
    }
}
