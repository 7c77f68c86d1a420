//! Preconditioner context and configuration for Krylov solvers.
//!
//! This module defines the `PcType` enum naming the supported preconditioners and the
//! `PcContext` factory that builds one from a frozen matrix snapshot.
//!
//! # Supported Preconditioners
//!
//! - None: identity.
//! - Jacobi: diagonal scaling preconditioner.
//! - BlockJacobi: contiguous dense diagonal blocks, LU-factored.
//!
//! # Example
//!
//! ```rust
//! use fesolve::context::pc_context::PcType;
//! let pc: PcType = "block_jacobi".parse().unwrap();
//! assert_eq!(pc, PcType::BlockJacobi);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::PcOptions;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::{BlockJacobi, Identity, Jacobi, Preconditioner};

/// Supported preconditioner kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcType {
    /// No preconditioning.
    None,
    /// Jacobi (diagonal scaling) preconditioner.
    Jacobi,
    /// Block Jacobi preconditioner over contiguous blocks.
    BlockJacobi,
}

impl FromStr for PcType {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "identity" => Ok(PcType::None),
            "jacobi" | "diagonal" => Ok(PcType::Jacobi),
            "block_jacobi" | "bjacobi" | "block-jacobi" => Ok(PcType::BlockJacobi),
            other => Err(KError::Configuration(format!("unknown preconditioner type '{other}'"))),
        }
    }
}

impl fmt::Display for PcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PcType::None => "none",
            PcType::Jacobi => "jacobi",
            PcType::BlockJacobi => "block_jacobi",
        };
        f.write_str(name)
    }
}

/// Preconditioner selection: kind plus Block-Jacobi width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcContext {
    pub kind: PcType,
    pub block_width: usize,
}

impl PcContext {
    pub fn new(kind: PcType, block_width: usize) -> Self {
        Self { kind, block_width }
    }

    pub fn from_options(opts: &PcOptions) -> Result<Self, KError> {
        Ok(Self::new(opts.pc_type.parse()?, opts.block_width))
    }

    /// Build and set up the preconditioner for `a`.
    pub fn build(&self, a: &dyn SparseMatrix) -> Result<Box<dyn Preconditioner>, KError> {
        let mut pc: Box<dyn Preconditioner> = match self.kind {
            PcType::None => Box::new(Identity),
            PcType::Jacobi => Box::new(Jacobi::new()),
            PcType::BlockJacobi => Box::new(BlockJacobi::new(self.block_width)),
        };
        pc.setup(a)?;
        Ok(pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseRowMatrix;

    #[test]
    fn unknown_kind_is_configuration_error() {
        let err = "ilu0".parse::<PcType>().unwrap_err();
        assert!(matches!(err, KError::Configuration(_)));
    }

    #[test]
    fn apply_is_idempotent() {
        let a = SparseRowMatrix::from_triplets(
            4,
            &[(0, 0, 3.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0), (2, 2, 5.0), (2, 3, 1.0), (3, 3, 4.0)],
        )
        .unwrap();
        for kind in [PcType::None, PcType::Jacobi, PcType::BlockJacobi] {
            let pc = PcContext::new(kind, 3).build(&a).unwrap();
            let r = [1.0, -2.0, 0.5, 3.0];
            let mut z1 = vec![0.0; 4];
            let mut z2 = vec![0.0; 4];
            pc.apply(&r, &mut z1).unwrap();
            pc.apply(&r, &mut z2).unwrap();
            assert_eq!(z1, z2, "{kind} is not idempotent");
        }
    }
}
