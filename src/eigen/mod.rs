//! Generalized eigenvalue solvers for the pencil `K·v = λ·M·v`.
//!
//! Lanczos and Arnoldi project the inverse operator `K⁻¹M` onto a Krylov subspace,
//! so their Ritz values approximate `θ = 1/λ`; Rayleigh-quotient iteration refines a
//! single eigenpair. Every application of `K⁻¹` (or of a shifted pencil inverse) is an
//! inner Jacobi-preconditioned Krylov solve through [`KspContext`]; errors raised there
//! come back wrapped with the name of the eigen method.
//!
//! # References
//! - Saad, Y. (2011). Numerical Methods for Large Eigenvalue Problems, 2nd Edition. SIAM.
//! - Press et al., Numerical Recipes, §11.3 (tridiagonal QL with implicit shifts)

use std::fmt;
use std::str::FromStr;

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::context::ksp_context::{KspContext, SolverType};
use crate::context::pc_context::PcType;
use crate::core::wrappers::{norm, scale};
use crate::error::KError;
use crate::matrix::SparseMatrix;

pub mod arnoldi;
pub mod lanczos;
pub mod ql;
pub mod qr;
pub mod rayleigh;

pub use ql::{pythag, ql_implicit};
pub use qr::{QrOutcome, qr_gram_schmidt};

/// Available eigenvalue strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigenMethod {
    /// Several eigenvalues of a symmetric pencil (tridiagonal projection + QL)
    Lanczos,
    /// Several eigenpairs of a general pencil (Hessenberg projection + QR)
    Arnoldi,
    /// One dominant eigenpair
    Rayleigh,
}

impl EigenMethod {
    pub fn name(&self) -> &'static str {
        match self {
            EigenMethod::Lanczos => "lanczos",
            EigenMethod::Arnoldi => "arnoldi",
            EigenMethod::Rayleigh => "rayleigh",
        }
    }
}

impl FromStr for EigenMethod {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lanczos" => Ok(EigenMethod::Lanczos),
            "arnoldi" => Ok(EigenMethod::Arnoldi),
            "rayleigh" | "rqi" => Ok(EigenMethod::Rayleigh),
            other => Err(KError::Configuration(format!("unknown eigenvalue method '{other}'"))),
        }
    }
}

impl fmt::Display for EigenMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Eigenvalues and matching eigenvectors; row `i` of `eigenvectors` pairs with `eigenvalues[i]`.
#[derive(Debug, Clone)]
pub struct EigenSolution {
    pub method: EigenMethod,
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Mat<f64>,
}

impl EigenSolution {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Eigenvector paired with eigenvalue `i`.
    pub fn eigenvector(&self, i: usize) -> Vec<f64> {
        (0..self.eigenvectors.ncols()).map(|j| self.eigenvectors[(i, j)]).collect()
    }
}

/// Numerical settings shared by the three methods.
#[derive(Debug, Clone)]
pub struct EigenSettings {
    pub n_eig: usize,
    pub tol: f64,
    pub max_iters: usize,
    pub inner_tol: f64,
    pub inner_max_iters: usize,
    pub seed: u64,
}

impl Default for EigenSettings {
    fn default() -> Self {
        Self {
            n_eig: 6,
            tol: 1e-10,
            max_iters: 2000,
            inner_tol: 1e-13,
            inner_max_iters: 2000,
            seed: 0x5eed,
        }
    }
}

impl EigenSettings {
    pub(crate) fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// x = A⁻¹ b by an inner Jacobi-preconditioned Krylov solve, errors tagged with `method`.
    pub(crate) fn inner_solve(
        &self,
        kind: SolverType,
        a: &dyn SparseMatrix,
        b: &[f64],
        method: EigenMethod,
    ) -> Result<Vec<f64>, KError> {
        let mut x = vec![0.0; b.len()];
        let mut ksp = KspContext::new()
            .with_type(kind)
            .with_pc(PcType::Jacobi, 1)
            .with_tol(self.inner_tol)
            .with_max_iters(self.inner_max_iters)
            .with_restart(b.len().clamp(1, 50));
        ksp.solve(a, b, &mut x).map_err(|e| e.within(method.name()))?;
        Ok(x)
    }
}

/// Random vector of unit length.
pub(crate) fn random_unit(n: usize, rng: &mut StdRng) -> Result<Vec<f64>, KError> {
    let mut v: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let nrm = norm(&v);
    if nrm == 0.0 {
        return Err(KError::Numerical("random start vector has zero norm".to_string()));
    }
    scale(1.0 / nrm, &mut v);
    Ok(v)
}

/// Convert Ritz values θ of `K⁻¹M` into pencil eigenvalues `|1/θ|`.
///
/// A θ at roundoff level of the largest one is the image of a null vector of `M`
/// (an infinite eigenvalue) and is reported as a numerical error.
pub(crate) fn invert_magnitudes(values: &mut [f64]) -> Result<(), KError> {
    let largest = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let floor = qr::dependence_floor(largest, values.len());
    if let Some(i) = values.iter().position(|v| v.abs() <= floor || !v.is_finite()) {
        return Err(KError::Numerical(format!(
            "Ritz value {i} is {:e}; the mass matrix is singular on the Krylov subspace",
            values[i]
        )));
    }
    for v in values.iter_mut() {
        *v = (1.0 / *v).abs();
    }
    Ok(())
}

/// Reorder several eigenpairs: swap entries 0 and 1, then sort ascending through an
/// index permutation applied to both values and eigenvector rows.
pub fn order_eigenpairs(values: &mut Vec<f64>, vectors: &mut Mat<f64>) {
    let k = values.len();
    if k < 2 {
        return;
    }
    // TODO: confirm whether the 0/1 swap is meant for every size or only for the
    // two-mode case; for distinct values the sort below makes it irrelevant.
    values.swap(0, 1);
    let swapped = Mat::from_fn(vectors.nrows(), vectors.ncols(), |i, j| match i {
        0 => vectors[(1, j)],
        1 => vectors[(0, j)],
        _ => vectors[(i, j)],
    });
    let mut perm: Vec<usize> = (0..k).collect();
    perm.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *values = perm.iter().map(|&p| values[p]).collect();
    *vectors = Mat::from_fn(swapped.nrows(), swapped.ncols(), |i, j| swapped[(perm[i], j)]);
}
