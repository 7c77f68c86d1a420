//! Vector kernels shared by the solvers.
//!
//! The handful of BLAS-1 style updates the Krylov and eigenvalue iterations need. Reductions and element-wise updates run on
//! rayon when the `rayon` feature is enabled; sums are associative-safe reductions so
//! the result does not depend on scheduling beyond floating-point reassociation.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use num_traits::Float;

/// Dot product of two slices of equal length.
pub fn dot<T: Float + Send + Sync>(x: &[T], y: &[T]) -> T {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(xi, yi)| *xi * *yi)
            .reduce(|| T::zero(), |acc, v| acc + v)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| *xi * *yi)
            .fold(T::zero(), |acc, v| acc + v)
    }
}

/// Euclidean norm of a slice.
pub fn norm<T: Float + Send + Sync>(x: &[T]) -> T {
    dot(x, x).sqrt()
}

/// y ← y + alpha·x
pub fn axpy<T: Float + Send + Sync>(alpha: T, x: &[T], y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        y.par_iter_mut().zip(x.par_iter()).for_each(|(yi, xi)| *yi = *yi + alpha * *xi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        y.iter_mut().zip(x.iter()).for_each(|(yi, xi)| *yi = *yi + alpha * *xi);
    }
}

/// x ← alpha·x
pub fn scale<T: Float + Send + Sync>(alpha: T, x: &mut [T]) {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter_mut().for_each(|xi| *xi = *xi * alpha);
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter_mut().for_each(|xi| *xi = *xi * alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn axpy_and_scale() {
        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![1.0, 1.0, 1.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, vec![3.0, 5.0, 7.0]);
        scale(0.5, &mut y);
        assert_eq!(y, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn dot_and_norm() {
        let x = vec![3.0, 4.0];
        assert_abs_diff_eq!(norm(&x), 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(dot(&x, &[1.0, -1.0]), -1.0, epsilon = 1e-15);
    }
}
