//! Command-line or API options for solvers and preconditioners.
//!
//! Method and type names are kept as strings so they can come straight from
//! a configuration file or command line; they are validated when a context
//! is built from them (`KspContext::from_options`, `EigenContext::from_options`),
//! which is where unknown names surface as `KError::Configuration`.

/// Preconditioner types & parameters.
#[derive(Debug, Clone)]
pub struct PcOptions {
    /// Type of preconditioner (none, jacobi, block_jacobi)
    pub pc_type: String,

    /// Block width for Block-Jacobi; shrunk until it divides the system size
    pub block_width: usize,
}

impl Default for PcOptions {
    fn default() -> Self {
        Self { pc_type: "jacobi".to_string(), block_width: 4 }
    }
}

/// Krylov solver types & parameters.
#[derive(Debug, Clone)]
pub struct KspOptions {
    /// Type of solver (cg, gmres)
    pub ksp_type: String,
    pub pc: PcOptions,
    /// Threshold on ‖r‖/(‖A‖·‖x‖+‖b‖)
    pub tol: f64,
    /// CG iterations, or GMRES outer (restart) cycles
    pub max_iters: usize,
    /// GMRES inner Krylov dimension
    pub restart: usize,
    /// Emit a progress line every `report_every` iterations (0 disables)
    pub report_every: usize,
}

impl Default for KspOptions {
    fn default() -> Self {
        Self {
            ksp_type: "cg".to_string(),
            pc: PcOptions::default(),
            tol: 1e-10,
            max_iters: 1000,
            restart: 30,
            report_every: 0,
        }
    }
}

/// Eigenvalue solver method & parameters.
#[derive(Debug, Clone)]
pub struct EigenOptions {
    /// Method (lanczos, arnoldi, rayleigh)
    pub method: String,
    /// Number of requested eigenvalues (ignored by rayleigh)
    pub n_eig: usize,
    /// Convergence threshold of the outer iteration (QR sweeps, Rayleigh shift)
    pub tol: f64,
    /// Cap on outer iterations
    pub max_iters: usize,
    /// Threshold handed to the inner linear solves
    pub inner_tol: f64,
    /// Iteration cap of the inner linear solves
    pub inner_max_iters: usize,
    /// Seed for the random start vector and initial shift
    pub seed: u64,
    pub report_every: usize,
}

impl Default for EigenOptions {
    fn default() -> Self {
        Self {
            method: "lanczos".to_string(),
            n_eig: 6,
            tol: 1e-10,
            max_iters: 2000,
            inner_tol: 1e-13,
            inner_max_iters: 2000,
            seed: 0x5eed,
            report_every: 0,
        }
    }
}
