//! covariance::inverse — best-of-two matrix inversion with an accuracy gate.
//!
//! Purpose
//! -------
//! Invert a covariance matrix for use as the correlated chi-square weight.
//! Sample covariances of strongly correlated time slices are badly
//! conditioned, so two candidates are computed and the more accurate one is
//! kept:
//!
//! 1. the direct inverse (LU with partial pivoting, `nalgebra::try_inverse`),
//! 2. the Cholesky inverse (`nalgebra::Cholesky`), defined only for
//!    symmetric positive-definite input.
//!
//! Each candidate is scored by `max |M · inv − I|`. The lower score wins; if
//! neither is within [`INVERSION_TOLERANCE`] the call fails with
//! [`CovError::Inversion`] carrying both scores.
//!
//! Conventions
//! -----------
//! - A Cholesky failure is reported with `log::warn!` and is not fatal on its
//!   own.
//! - Non-finite scores count as failed candidates.
use log::{debug, warn};
use nalgebra::{Cholesky, DMatrix};
use ndarray::Array2;

use super::errors::{CovError, CovResult};
use crate::utils::{to_array2, to_dmatrix};

/// Largest accepted entry of `|M · inv − I|`.
pub const INVERSION_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseMethod {
    Direct,
    Cholesky,
}

/// The selected inverse with its accuracy score.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseEstimate {
    pub matrix: Array2<f64>,
    pub method: InverseMethod,
    /// `max |M · inv − I|` of the selected candidate.
    pub max_error: f64,
}

/// Maximum absolute deviation of `m · inv` from the identity.
pub fn inversion_error(m: &DMatrix<f64>, inv: &DMatrix<f64>) -> f64 {
    let product = m * inv;
    let n = product.nrows();
    let mut worst = 0.0_f64;
    for j in 0..n {
        for i in 0..n {
            let target = if i == j { 1.0 } else { 0.0 };
            let dev = (product[(i, j)] - target).abs();
            if dev.is_nan() {
                return f64::NAN;
            }
            worst = worst.max(dev);
        }
    }
    worst
}

pub fn best_inverse(matrix: &Array2<f64>) -> CovResult<InverseEstimate> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(CovError::NotSquare { rows, cols });
    }
    let m = to_dmatrix(matrix);

    let direct = m.clone().try_inverse().map(|inv| {
        let err = inversion_error(&m, &inv);
        (inv, err)
    });
    let cholesky = match Cholesky::new(m.clone()) {
        Some(chol) => {
            let inv = chol.inverse();
            let err = inversion_error(&m, &inv);
            Some((inv, err))
        }
        None => {
            warn!("Cholesky factorization failed for {rows}x{cols} covariance matrix; using direct inverse only");
            None
        }
    };

    let direct_error = direct.as_ref().map(|(_, e)| *e);
    let cholesky_error = cholesky.as_ref().map(|(_, e)| *e);
    debug!("Inverse accuracy: direct {direct_error:?}, cholesky {cholesky_error:?}");

    let accepted = |c: Option<(DMatrix<f64>, f64)>, method: InverseMethod| {
        c.filter(|(_, e)| e.is_finite() && *e <= INVERSION_TOLERANCE)
            .map(|(inv, e)| (inv, e, method))
    };
    let best = match (accepted(direct, InverseMethod::Direct), accepted(cholesky, InverseMethod::Cholesky)) {
        (Some(d), Some(c)) => Some(if c.1 < d.1 { c } else { d }),
        (d, c) => d.or(c),
    };

    match best {
        Some((inv, max_error, method)) => Ok(InverseEstimate { matrix: to_array2(&inv), method, max_error }),
        None => Err(CovError::Inversion { direct_error, cholesky_error, tolerance: INVERSION_TOLERANCE }),
    }
}
