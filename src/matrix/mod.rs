//! Matrix module: the sparse matrix contract and dense helpers on faer.

pub mod dense;
pub use dense::DenseMatrix;
pub mod sparse;
pub use sparse::{SparseMatrix, SparseRowMatrix};
