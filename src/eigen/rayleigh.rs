//! Rayleigh-quotient iteration for the dominant eigenpair of `K⁻¹M`.
//!
//! The iteration keeps the shifted pencil `M₂ = M + μ·K` with `μ = −θ`, where
//! `θ = (M·b)·b / (K·b)·b` is the inverse Rayleigh quotient of the current iterate.
//! `μ` starts at a large random value, so the first convergence check always fails.
//! Until the quotient has settled the iterate is advanced by plain inverse-power
//! steps `K·y = M·b`, which pull it towards the dominant θ; after that each step
//! solves the shifted system `M₂·c = K·b/‖K·b‖`, converging locally at a cubic rate.

use rand::Rng;

use crate::context::ksp_context::SolverType;
use crate::core::wrappers::{dot, norm, scale};
use crate::eigen::qr::dependence_floor;
use crate::eigen::{EigenMethod, EigenSettings, EigenSolution, random_unit};
use crate::error::KError;
use crate::matrix::{SparseMatrix, SparseRowMatrix};
use crate::utils::convergence::{Convergence, ConvergenceTracker, ProgressSink};

/// Relative change of μ below which shifted solves replace inverse-power steps.
pub const SHIFT_SETTLE: f64 = 1e-2;

/// Relative offset keeping `M₂` non-singular once θ is exact to working precision.
pub const SHIFT_OFFSET: f64 = 1e-10;

const INITIAL_SHIFT_SCALE: f64 = 1e12;

fn shifted_pencil(m: &dyn SparseMatrix, k: &dyn SparseMatrix, mu: f64) -> Result<SparseRowMatrix, KError> {
    let mut m2 = SparseRowMatrix::new(m.rows());
    m2.add_scaled(m, 1.0)?;
    m2.add_scaled(k, mu)?;
    Ok(m2)
}

/// Scale `y` to unit length; `reference` is the norm a solve with a non-degenerate
/// right-hand side would produce, so anything at roundoff level of it is fatal.
fn normalized(mut y: Vec<f64>, reference: f64, step: usize) -> Result<Vec<f64>, KError> {
    let c_norm = norm(&y);
    if c_norm <= dependence_floor(reference, y.len()) || !c_norm.is_finite() {
        return Err(KError::Numerical(format!("rayleigh: iterate has norm {c_norm:e} at step {step}")));
    }
    scale(1.0 / c_norm, &mut y);
    Ok(y)
}

/// Dominant eigenpair; the eigenvalue is reported for the pencil, `λ = 1/θ`.
pub fn rayleigh(
    m: &dyn SparseMatrix,
    k: &dyn SparseMatrix,
    settings: &EigenSettings,
    report_every: usize,
    sink: Option<&mut ProgressSink>,
) -> Result<EigenSolution, KError> {
    let n = k.rows();
    let method = EigenMethod::Rayleigh;
    let mut rng = settings.rng();
    let mut b = random_unit(n, &mut rng)?;
    let mut mu = INITIAL_SHIFT_SCALE * (1.0 + rng.r#gen::<f64>());
    let mut shifted = false;
    let mut mb = vec![0.0; n];
    let mut kb = vec![0.0; n];
    let (m_norm, k_norm) = (m.norm(), k.norm());
    let conv = Convergence { tol: settings.tol, max_iters: settings.max_iters };
    let mut tracker = ConvergenceTracker::new("rayleigh", conv, report_every).with_sink(sink);

    for step in 1..=settings.max_iters {
        let (y, reference) = if shifted {
            k.multiply(&b, &mut kb);
            let kb_norm = norm(&kb);
            if kb_norm == 0.0 {
                return Err(KError::Numerical(format!("rayleigh: K·b vanished at step {step}")));
            }
            scale(1.0 / kb_norm, &mut kb);
            let m2 = shifted_pencil(m, k, mu * (1.0 + SHIFT_OFFSET))?;
            (settings.inner_solve(SolverType::Gmres, &m2, &kb, method)?, 1.0 / m2.norm())
        } else {
            m.multiply(&b, &mut mb);
            (settings.inner_solve(SolverType::Gmres, k, &mb, method)?, m_norm / k_norm)
        };
        b = normalized(y, reference, step)?;

        m.multiply(&b, &mut mb);
        k.multiply(&b, &mut kb);
        let bkb = dot(&kb, &b);
        if bkb == 0.0 {
            return Err(KError::Numerical(format!("rayleigh: (K·b)·b vanished at step {step}")));
        }
        let theta = dot(&mb, &b) / bkb;
        let mu_old = mu;
        mu = -theta;
        let change = (mu_old - mu).abs() / mu.abs().max(f64::MIN_POSITIVE);
        if tracker.update(step, change) {
            break;
        }
        if !shifted && change < SHIFT_SETTLE {
            log::debug!("rayleigh: switching to shifted solves at step {step} (theta={theta:e})");
            shifted = true;
        }
    }
    let stats = tracker.finish();
    log::debug!("rayleigh: {} iterations, converged={}", stats.iterations, stats.converged);

    m.multiply(&b, &mut mb);
    k.multiply(&b, &mut kb);
    let lambda = dot(&kb, &b) / dot(&mb, &b);
    if !lambda.is_finite() {
        return Err(KError::Numerical("rayleigh: (M·b)·b vanished".to_string()));
    }
    let vectors = faer::Mat::from_fn(1, n, |_, j| b[j]);
    Ok(EigenSolution { method, eigenvalues: vec![lambda], eigenvectors: vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn laplacian(n: usize) -> SparseRowMatrix {
        let mut k = SparseRowMatrix::new(n);
        for i in 0..n {
            k.add(i, i, 2.0);
            if i > 0 {
                k.add(i, i - 1, -1.0);
                k.add(i - 1, i, -1.0);
            }
        }
        k
    }

    #[test]
    fn iteration_cap_still_returns_estimate() {
        let n = 6;
        let (m, k) = (SparseRowMatrix::identity(n), laplacian(n));
        let settings = EigenSettings { max_iters: 2, ..Default::default() };
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen = Arc::clone(&lines);
        let mut sink: ProgressSink = Box::new(move |line: &str| seen.lock().unwrap().push(line.to_string()));
        let sol = rayleigh(&m, &k, &settings, 1, Some(&mut sink)).unwrap();
        assert_eq!(sol.len(), 1);
        assert!(sol.eigenvalues[0].is_finite() && sol.eigenvalues[0] > 0.0);
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("rayleigh: iteration 2 of 2"), "{}", lines[1]);
    }

    #[test]
    fn null_mass_is_numerical_error() {
        let n = 4;
        let m = SparseRowMatrix::new(n);
        let err = rayleigh(&m, &laplacian(n), &EigenSettings::default(), 0, None).unwrap_err();
        assert!(err.is_numerical(), "{err}");
    }
}
