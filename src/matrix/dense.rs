//! Dense‐matrix helpers on top of Faer.
//!
//! Preconditioner blocks, Hessenberg/tridiagonal buffers and eigenvector matrices are
//! plain `faer::Mat<f64>`; this trait adds the constructors the solvers use.

use faer::Mat;

/// Constructors and queries shared by the dense buffers.
pub trait DenseMatrix<T> {
    /// Construct from raw column-major storage.
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self;
    /// Construct a matrix whose columns are the given vectors.
    fn from_columns(nrows: usize, columns: &[Vec<T>]) -> Self;
    /// Largest magnitude strictly below the diagonal.
    fn max_below_diagonal(&self) -> T;
}

impl<T: Copy + num_traits::Float> DenseMatrix<T> for Mat<T> {
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        Mat::from_fn(nrows, ncols, |i, j| data[j * nrows + i])
    }

    fn from_columns(nrows: usize, columns: &[Vec<T>]) -> Self {
        Mat::from_fn(nrows, columns.len(), |i, j| columns[j][i])
    }

    fn max_below_diagonal(&self) -> T {
        let mut max = T::zero();
        for j in 0..self.ncols() {
            for i in (j + 1)..self.nrows() {
                max = max.max(self[(i, j)].abs());
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_column_major() {
        let m = <Mat<f64> as DenseMatrix<f64>>::from_raw(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m[(1, 0)], 2.0);
        assert_eq!(m[(0, 1)], 3.0);
    }

    #[test]
    fn below_diagonal_ignores_upper_part() {
        let m = Mat::from_fn(3, 3, |i, j| if i > j { -(i as f64) * 0.1 } else { 10.0 });
        assert!((m.max_below_diagonal() - 0.2).abs() < 1e-15);
    }
}
