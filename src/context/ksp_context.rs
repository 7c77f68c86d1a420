//! Factory for Krylov Subspace Methods (KSP).
//!
//! This module provides the `KspContext` struct, which selects a Krylov solver and a
//! preconditioner, and solves linear systems in a unified way.
//!
//! # Usage
//!
//! 1. Construct a `KspContext` (directly, with the builder methods, or from `KspOptions`).
//! 2. Call `solve` with the matrix, right-hand side and initial guess.
//!
//! Before iterating, the system is rescaled by `1e9 / |‖b‖/‖A‖|` so that iteration
//! magnitudes do not depend on the physical units of the assembled problem; the
//! solution is unscaled before returning.
//!
//! # Supported Solvers
//! - CG (symmetric systems), restarted GMRES (general systems)
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - Templates for the Solution of Linear Systems: Building Blocks for Iterative Methods, 2nd Edition (Barrett et al.)

use std::fmt;
use std::str::FromStr;

use crate::config::KspOptions;
use crate::context::pc_context::{PcContext, PcType};
use crate::core::wrappers::{norm, scale};
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::solver::{CgSolver, GmresSolver, LinearSolver};
use crate::utils::convergence::{Convergence, ConvergenceTracker, ProgressSink, SolveStats};

/// Target magnitude of ‖b‖/‖A‖ after scaling.
pub const EQUATION_SCALE_TARGET: f64 = 1e9;

/// Enum representing the available Krylov solver types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverType {
    /// Conjugate Gradient (CG) method (for symmetric matrices)
    Cg,
    /// Restarted GMRES with right preconditioning
    Gmres,
}

impl FromStr for SolverType {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cg" | "pcg" => Ok(SolverType::Cg),
            "gmres" => Ok(SolverType::Gmres),
            other => Err(KError::Configuration(format!("unknown solver type '{other}'"))),
        }
    }
}

impl fmt::Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverType::Cg => "cg",
            SolverType::Gmres => "gmres",
        })
    }
}

/// Scale factor `1e9 / |‖b‖/‖A‖|`, or 1 when it is not finite and positive.
pub fn equation_scale(b_norm: f64, a_norm: f64) -> f64 {
    let s = EQUATION_SCALE_TARGET / (b_norm / a_norm).abs();
    if s.is_finite() && s > 0.0 { s } else { 1.0 }
}

/// Context and configuration for a Krylov subspace solver.
pub struct KspContext {
    /// The type of Krylov solver to use
    pub kind: SolverType,
    /// Preconditioner built from the matrix at the start of every solve
    pub pc: PcContext,
    /// Threshold on the residual ratio ‖r‖/(‖A‖·‖x‖+‖b‖)
    pub tol: f64,
    /// Maximum number of iterations (GMRES: restart cycles)
    pub max_it: usize,
    /// Restart parameter (for GMRES)
    pub restart: usize,
    /// Progress reporting cadence, 0 to disable
    pub report_every: usize,
    monitor: Option<ProgressSink>,
}

impl Default for KspContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KspContext {
    pub fn new() -> Self {
        Self {
            kind: SolverType::Cg,
            pc: PcContext::new(PcType::Jacobi, 1),
            tol: 1e-10,
            max_it: 1000,
            restart: 30,
            report_every: 0,
            monitor: None,
        }
    }

    /// Build from string-typed options; unknown names are configuration errors.
    pub fn from_options(opts: &KspOptions) -> Result<Self, KError> {
        Ok(Self {
            kind: opts.ksp_type.parse()?,
            pc: PcContext::from_options(&opts.pc)?,
            tol: opts.tol,
            max_it: opts.max_iters,
            restart: opts.restart,
            report_every: opts.report_every,
            monitor: None,
        })
    }

    pub fn with_type(mut self, kind: SolverType) -> Self {
        self.kind = kind;
        self
    }
    pub fn with_pc(mut self, kind: PcType, block_width: usize) -> Self {
        self.pc = PcContext::new(kind, block_width);
        self
    }
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_max_iters(mut self, max_it: usize) -> Self {
        self.max_it = max_it;
        self
    }
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart;
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

    /// Solve the linear system `Ax = b` using the configured solver and preconditioner.
    ///
    /// # Arguments
    /// * `a` - System matrix; only read during the solve
    /// * `b` - Right-hand side vector
    /// * `x` - Initial guess on entry, solution on exit
    ///
    /// # Returns
    /// * `Ok(SolveStats)` whether or not the threshold was reached; check `converged`
    /// * `Err(KError)` on dimension mismatch or preconditioner failure
    pub fn solve(&mut self, a: &dyn SparseMatrix, b: &[f64], x: &mut [f64]) -> Result<SolveStats<f64>, KError> {
        let n = a.rows();
        if b.len() != n || x.len() != n {
            return Err(KError::DimensionMismatch { expected: n, found: if b.len() != n { b.len() } else { x.len() } });
        }
        let b_norm = norm(b);
        if b_norm == 0.0 {
            x.iter_mut().for_each(|xi| *xi = 0.0);
            return Ok(SolveStats { iterations: 0, final_residual: 0.0, converged: true });
        }
        let s = equation_scale(b_norm, a.norm());
        let mut b_scaled = b.to_vec();
        scale(s, &mut b_scaled);
        scale(s, x);

        let pc = self.pc.build(a)?;
        let conv = Convergence { tol: self.tol, max_iters: self.max_it };
        let label = match self.kind {
            SolverType::Cg => "cg",
            SolverType::Gmres => "gmres",
        };
        let mut tracker = ConvergenceTracker::new(label, conv, self.report_every).with_sink(self.monitor.as_mut());
        let outcome = match self.kind {
            SolverType::Cg => CgSolver::new().solve(a, pc.as_ref(), &b_scaled, x, &mut tracker),
            SolverType::Gmres => GmresSolver::new(self.restart).solve(a, pc.as_ref(), &b_scaled, x, &mut tracker),
        };
        scale(1.0 / s, x);
        outcome?;
        Ok(tracker.finish())
    }
}
