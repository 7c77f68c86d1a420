// Block-Jacobi preconditioner implementation

use crate::error::KError;
use crate::matrix::{DenseMatrix, SparseMatrix};
use crate::preconditioner::Preconditioner;
use crate::solver::direct_lu::LuSolver;
use faer::Mat;

/// Block-Jacobi preconditioner over contiguous, equally sized diagonal blocks.
pub struct BlockJacobi {
    block_width: usize,
    block_factors: Vec<LuSolver>,
}

impl BlockJacobi {
    /// `block_width` is a request; setup shrinks it until it divides the row count.
    pub fn new(block_width: usize) -> Self {
        Self { block_width, block_factors: Vec::new() }
    }

    /// Width actually used after `setup`.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    pub fn num_blocks(&self) -> usize {
        self.block_factors.len()
    }
}

/// Largest width ≤ `requested` (and ≥ 1) that divides `n`.
pub fn effective_block_width(n: usize, requested: usize) -> usize {
    let mut w = requested.clamp(1, n.max(1));
    while n % w != 0 {
        w -= 1;
    }
    w
}

fn extract_block(a: &dyn SparseMatrix, start: usize, w: usize) -> Mat<f64> {
    let mut data = vec![0.0; w * w];
    for ii in 0..w {
        let i = start + ii;
        for (p, &j) in a.row_indexes(i).iter().enumerate() {
            if (start..start + w).contains(&j) {
                data[(j - start) * w + ii] = a.value(i, p);
            }
        }
    }
    <Mat<f64> as DenseMatrix<f64>>::from_raw(w, w, data)
}

impl Preconditioner for BlockJacobi {
    /// Setup: factor each block using LuSolver
    fn setup(&mut self, a: &dyn SparseMatrix) -> Result<(), KError> {
        let n = a.rows();
        let w = effective_block_width(n, self.block_width);
        self.block_width = w;
        let starts: Vec<usize> = (0..n).step_by(w).collect();
        let factor = |&start: &usize| {
            let mut lu = LuSolver::new();
            lu.factor(&extract_block(a, start, w));
            lu
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            self.block_factors = starts.par_iter().map(factor).collect();
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.block_factors = starts.iter().map(factor).collect();
        }
        Ok(())
    }

    /// Apply: z = P r, one independent dense solve per block
    fn apply(&self, r: &[f64], z: &mut [f64]) -> Result<(), KError> {
        let n = self.block_width * self.block_factors.len();
        if r.len() != n || z.len() != n {
            return Err(KError::DimensionMismatch { expected: n, found: r.len() });
        }
        if n == 0 {
            return Ok(());
        }
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            z.par_chunks_mut(self.block_width)
                .zip(r.par_chunks(self.block_width))
                .zip(self.block_factors.par_iter())
                .try_for_each(|((z_block, r_block), lu)| lu.solve_cached(r_block, z_block))
        }
        #[cfg(not(feature = "rayon"))]
        {
            z.chunks_mut(self.block_width)
                .zip(r.chunks(self.block_width))
                .zip(self.block_factors.iter())
                .try_for_each(|((z_block, r_block), lu)| lu.solve_cached(r_block, z_block))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseRowMatrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn width_shrinks_to_divisor() {
        assert_eq!(effective_block_width(10, 4), 2);
        assert_eq!(effective_block_width(9, 4), 3);
        assert_eq!(effective_block_width(7, 4), 1);
        assert_eq!(effective_block_width(6, 0), 1);
        assert_eq!(effective_block_width(3, 8), 3);
    }

    #[test]
    fn exact_inverse_of_block_diagonal() {
        // two 2x2 blocks [[4,1],[2,3]] and [[2,0],[1,1]], coupling entry outside blocks
        let a = SparseRowMatrix::from_triplets(
            4,
            &[
                (0, 0, 4.0), (0, 1, 1.0), (1, 0, 2.0), (1, 1, 3.0),
                (2, 2, 2.0), (3, 2, 1.0), (3, 3, 1.0), (0, 3, 7.0),
            ],
        )
        .unwrap();
        let mut pc = BlockJacobi::new(2);
        pc.setup(&a).unwrap();
        assert_eq!(pc.num_blocks(), 2);
        let mut z = vec![0.0; 4];
        pc.apply(&[5.0, 5.0, 2.0, 2.0], &mut z).unwrap();
        for (zi, ei) in z.iter().zip([1.0, 1.0, 1.0, 1.0]) {
            assert_abs_diff_eq!(*zi, ei, epsilon = 1e-12);
        }
    }
}
