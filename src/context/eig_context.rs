//! Factory for generalized eigenvalue solves of the pencil `K·v = λ·M·v`.
//!
//! `EigenContext` selects Lanczos, Arnoldi or Rayleigh-quotient iteration and turns
//! the Ritz values they produce (approximations of `θ = 1/λ`) into pencil
//! eigenvalues. Multi-eigenvalue results are returned in ascending order with the
//! eigenvector rows permuted alongside.

use crate::config::EigenOptions;
use crate::eigen::arnoldi::arnoldi;
use crate::eigen::lanczos::lanczos;
use crate::eigen::rayleigh::rayleigh;
use crate::eigen::{EigenMethod, EigenSettings, EigenSolution, invert_magnitudes, order_eigenpairs};
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::utils::convergence::ProgressSink;

/// Context and configuration for an eigenvalue solve.
pub struct EigenContext {
    pub method: EigenMethod,
    pub settings: EigenSettings,
    /// Progress reporting cadence of the Rayleigh outer loop, 0 to disable
    pub report_every: usize,
    monitor: Option<ProgressSink>,
}

impl EigenContext {
    pub fn new(method: EigenMethod) -> Self {
        Self { method, settings: EigenSettings::default(), report_every: 0, monitor: None }
    }

    /// Build from string-typed options; an unknown method is a configuration error.
    pub fn from_options(opts: &EigenOptions) -> Result<Self, KError> {
        Ok(Self {
            method: opts.method.parse()?,
            settings: EigenSettings {
                n_eig: opts.n_eig,
                tol: opts.tol,
                max_iters: opts.max_iters,
                inner_tol: opts.inner_tol,
                inner_max_iters: opts.inner_max_iters,
                seed: opts.seed,
            },
            report_every: opts.report_every,
            monitor: None,
        })
    }

    pub fn with_n_eig(mut self, n_eig: usize) -> Self {
        self.settings.n_eig = n_eig;
        self
    }
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.settings.tol = tol;
        self
    }
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.settings.max_iters = max_iters;
        self
    }
    pub fn with_inner(mut self, tol: f64, max_iters: usize) -> Self {
        self.settings.inner_tol = tol;
        self.settings.inner_max_iters = max_iters;
        self
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }
    pub fn with_report_every(mut self, every: usize) -> Self {
        self.report_every = every;
        self
    }
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where F: FnMut(&str) + Send + 'static {
        self.monitor = Some(Box::new(f));
        self
    }

    /// Eigenpairs of `K·v = λ·M·v`.
    ///
    /// Lanczos and Arnoldi return `min(n_eig, n)` eigenvalues sorted ascending;
    /// Rayleigh returns the single eigenvalue of smallest magnitude. Failures of
    /// an inner linear solve come back as `KError::Inner` tagged with the method.
    pub fn solve(&mut self, m: &dyn SparseMatrix, k: &dyn SparseMatrix) -> Result<EigenSolution, KError> {
        let n = k.rows();
        if m.rows() != n {
            return Err(KError::DimensionMismatch { expected: n, found: m.rows() });
        }
        if n == 0 {
            return Err(KError::Configuration("eigenvalue solve of an empty pencil".to_string()));
        }
        if self.settings.n_eig == 0 && self.method != EigenMethod::Rayleigh {
            return Err(KError::Configuration("n_eig must be at least 1".to_string()));
        }
        log::debug!("{}: solving pencil of size {n} for {} eigenvalue(s)", self.method, self.settings.n_eig.min(n));
        match self.method {
            EigenMethod::Rayleigh => rayleigh(m, k, &self.settings, self.report_every, self.monitor.as_mut()),
            EigenMethod::Lanczos | EigenMethod::Arnoldi => {
                let mut sol = if self.method == EigenMethod::Lanczos {
                    lanczos(m, k, &self.settings)?
                } else {
                    arnoldi(m, k, &self.settings)?
                };
                invert_magnitudes(&mut sol.eigenvalues).map_err(|err| err.within(self.method.name()))?;
                if sol.len() > 1 {
                    order_eigenpairs(&mut sol.eigenvalues, &mut sol.eigenvectors);
                }
                Ok(sol)
            }
        }
    }
}
