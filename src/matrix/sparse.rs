// SparseMatrix contract and the row-sparse implementation used by assembly code

use crate::error::KError;

/// Access contract for a square, row-sparse matrix.
///
/// Column indices are row-local: `value(i, p)` is the entry at column
/// `row_indexes(i)[p]`. The row count never changes while a solve borrows the
/// matrix, and `multiply` must not mutate it, so one matrix may be shared by
/// concurrent solves.
pub trait SparseMatrix: Sync {
    /// Number of rows (and columns).
    fn rows(&self) -> usize;
    /// Column indices stored in row `i`, without duplicates.
    fn row_indexes(&self, i: usize) -> &[usize];
    /// Value at position `position` of row `i`.
    fn value(&self, i: usize, position: usize) -> f64;
    /// Accumulate `value` into (i, j), inserting the entry when absent.
    fn add(&mut self, i: usize, j: usize, value: f64);
    /// Compute y = A * x.  `x.len() == y.len() == rows()`.
    fn multiply(&self, x: &[f64], y: &mut [f64]);
    /// Frobenius norm.
    fn norm(&self) -> f64;

    /// Entry (i, j), zero when not stored.
    fn get(&self, i: usize, j: usize) -> f64 {
        self.row_indexes(i)
            .iter()
            .position(|&c| c == j)
            .map_or(0.0, |p| self.value(i, p))
    }

    /// Diagonal entry of row `i`.
    fn diagonal(&self, i: usize) -> f64 {
        self.get(i, i)
    }
}

/// Row-sparse matrix: each row keeps its own sorted column list and values.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRowMatrix {
    cols: Vec<Vec<usize>>,
    vals: Vec<Vec<f64>>,
}

impl SparseRowMatrix {
    /// Empty n×n matrix.
    pub fn new(n: usize) -> Self {
        Self { cols: vec![Vec::new(); n], vals: vec![Vec::new(); n] }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    pub fn from_diagonal(diag: &[f64]) -> Self {
        let mut m = Self::new(diag.len());
        for (i, &d) in diag.iter().enumerate() {
            m.add(i, i, d);
        }
        m
    }

    /// Accumulate (row, col, value) triplets; repeated coordinates are summed.
    pub fn from_triplets(n: usize, triplets: &[(usize, usize, f64)]) -> Result<Self, KError> {
        let mut m = Self::new(n);
        for &(i, j, v) in triplets {
            if i >= n || j >= n {
                return Err(KError::DimensionMismatch { expected: n, found: i.max(j) + 1 });
            }
            m.add(i, j, v);
        }
        Ok(m)
    }

    /// Build from raw row-ptr, col-idx, and values.
    pub fn from_csr(
        n: usize,
        row_ptr: &[usize],
        col_idx: &[usize],
        values: &[f64],
    ) -> Result<Self, KError> {
        if row_ptr.len() != n + 1 {
            return Err(KError::DimensionMismatch { expected: n + 1, found: row_ptr.len() });
        }
        if col_idx.len() != values.len() {
            return Err(KError::DimensionMismatch { expected: col_idx.len(), found: values.len() });
        }
        if row_ptr[n] != col_idx.len() || row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(KError::Configuration("row_ptr is not a monotone prefix over col_idx".to_string()));
        }
        let mut m = Self::new(n);
        for i in 0..n {
            for k in row_ptr[i]..row_ptr[i + 1] {
                let j = col_idx[k];
                if j >= n {
                    return Err(KError::DimensionMismatch { expected: n, found: j + 1 });
                }
                m.add(i, j, values[k]);
            }
        }
        Ok(m)
    }

    /// self ← self + alpha·other, entry by entry.
    pub fn add_scaled(&mut self, other: &(impl SparseMatrix + ?Sized), alpha: f64) -> Result<(), KError> {
        if other.rows() != self.rows() {
            return Err(KError::DimensionMismatch { expected: self.rows(), found: other.rows() });
        }
        for i in 0..other.rows() {
            for (p, &j) in other.row_indexes(i).iter().enumerate() {
                self.add(i, j, alpha * other.value(i, p));
            }
        }
        Ok(())
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.cols.iter().map(Vec::len).sum()
    }

    fn row_dot(&self, i: usize, x: &[f64]) -> f64 {
        self.cols[i].iter().zip(&self.vals[i]).map(|(&j, &v)| v * x[j]).sum()
    }
}

impl SparseMatrix for SparseRowMatrix {
    fn rows(&self) -> usize {
        self.cols.len()
    }

    fn row_indexes(&self, i: usize) -> &[usize] {
        &self.cols[i]
    }

    fn value(&self, i: usize, position: usize) -> f64 {
        self.vals[i][position]
    }

    fn add(&mut self, i: usize, j: usize, value: f64) {
        match self.cols[i].binary_search(&j) {
            Ok(p) => self.vals[i][p] += value,
            Err(p) => {
                self.cols[i].insert(p, j);
                self.vals[i].insert(p, value);
            }
        }
    }

    fn multiply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.rows());
        assert_eq!(y.len(), self.rows());
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = self.row_dot(i, x));
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = self.row_dot(i, x);
            }
        }
    }

    fn norm(&self) -> f64 {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            self.vals
                .par_iter()
                .map(|row| row.iter().map(|v| v * v).sum::<f64>())
                .sum::<f64>()
                .sqrt()
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.vals.iter().flatten().map(|v| v * v).sum::<f64>().sqrt()
        }
    }
}
