//! utils — conversions between `ndarray` storage and `nalgebra` linear algebra.
//!
//! Series, covariance matrices and parameter vectors live in `ndarray`;
//! factorizations (LU, Cholesky) run on `nalgebra::DMatrix`. These helpers
//! copy element-wise in either direction without assuming symmetry.
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Copy a square or rectangular `Array2` into a pre-sized `DMatrix`.
pub fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    for ((i, j), &v) in src.indexed_iter() {
        dst[(i, j)] = v;
    }
}

#[inline]
pub fn to_dmatrix(src: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = src.dim();
    let mut dst = DMatrix::<f64>::zeros(rows, cols);
    fill_dmatrix(src, &mut dst);
    dst
}

#[inline]
pub fn to_dvector(src: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(src.len(), src.iter().copied())
}

pub fn to_array2(src: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn(src.shape(), |(i, j)| src[(i, j)])
}

#[inline]
pub fn to_array1(src: &DVector<f64>) -> Array1<f64> {
    src.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Ensure the bridge copies entries in place, including non-symmetric ones.
    //
    // Given
    // -----
    // - A 2×3 ndarray matrix.
    //
    // Expect
    // ------
    // - `to_dmatrix` followed by `to_array2` reproduces the input exactly.
    fn bridge_round_trips_rectangular_matrix() {
        // Arrange
        let m: Array2<f64> = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

        // Act
        let d = to_dmatrix(&m);
        let back = to_array2(&d);

        // Assert
        assert_eq!(d[(0, 2)], 3.0);
        assert_eq!(d[(1, 0)], 4.0);
        assert_eq!(back, m);
    }

    #[test]
    fn vector_bridge_preserves_order() {
        let v: Array1<f64> = array![0.5, -1.0, 2.0];

        let d = to_dvector(&v);

        assert_eq!(d[1], -1.0);
        assert_eq!(to_array1(&d), v);
    }
}
