//! covariance::estimator — covariance of the mean over a fit window.
//!
//! Purpose
//! -------
//! Estimate the covariance between time slices of the averaged,
//! vacuum-subtracted correlator. This is the weight matrix of the correlated
//! chi-square.
//!
//! Conventions
//! -----------
//! - The window is half-open: `[tmin, tmax)`; the matrix is
//!   `(tmax − tmin) × (tmax − tmin)` in chronological order.
//! - With `d_c = S(c, ·) − mean(·)` restricted to the window,
//!   `C = 1/N · 1/(N−1) · Σ_c d_c d_cᵀ` (covariance *of the mean*).
//! - Symmetric positive semi-definite by construction.
use ndarray::{Array2, Axis};

use super::errors::{CovError, CovResult};
use crate::series::{Correlator, IndexedSeries, Time};

/// Dense column positions of `[tmin, tmax)` inside `series`.
pub(crate) fn window_positions(series: &IndexedSeries<f64>, tmin: Time, tmax: Time) -> CovResult<Vec<usize>> {
    if tmin >= tmax {
        return Err(CovError::EmptyWindow { tmin, tmax });
    }
    (tmin..tmax).map(|t| series.time_position(t).map_err(CovError::from)).collect()
}

/// Covariance of the mean of the vacuum-subtracted correlator on `[tmin, tmax)`.
///
/// # Errors
/// - [`CovError::TooFewConfigs`] when fewer than two configurations exist.
/// - [`CovError::EmptyWindow`] / [`CovError::TimeOutOfRange`] for windows not
///   fully covered by the data.
pub fn covariance_matrix(cor: &Correlator, tmin: Time, tmax: Time) -> CovResult<Array2<f64>> {
    let series = cor.sub_vev();
    let n = series.num_configs();
    if n < 2 {
        return Err(CovError::TooFewConfigs { found: n });
    }
    let positions = window_positions(series, tmin, tmax)?;

    let window = series.values().select(Axis(1), &positions);
    let mean = cor.average_sub_vev().select(Axis(0), &positions);
    let deviations = &window - &mean;

    let norm = 1.0 / (n as f64 * (n - 1) as f64);
    let mut cov = deviations.t().dot(&deviations);
    cov.mapv_inplace(|v| v * norm);
    Ok(cov)
}

#[cfg(test)]
mod tests {
    // Scope
    // -----
    // Normalization, symmetry and window validation of `covariance_matrix`.
    use super::*;
    use approx::assert_relative_eq;

    fn correlator(rows: &[&[f64]]) -> Correlator {
        let rows = rows.iter().map(|r| r.iter().copied().enumerate().collect()).collect();
        Correlator::without_vev(IndexedSeries::from_rows(rows).unwrap()).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Diagonal entries equal the squared standard error of the mean, i.e.
    // the squared jackknife error for a linear estimator.
    //
    // Given
    // -----
    // - 4 configurations × 3 times.
    //
    // Expect
    // ------
    // - C[t, t] = jackknife_error[t]² for every t in the window.
    // - C is symmetric.
    fn diagonal_matches_squared_jackknife_error() {
        // Arrange
        let cor = correlator(&[
            &[1.0, 2.0, 0.5],
            &[1.4, 2.1, 0.2],
            &[0.8, 1.7, 0.9],
            &[1.1, 2.6, 0.4],
        ]);

        // Act
        let cov = covariance_matrix(&cor, 0, 3).unwrap();
        let errors = cor.jackknifed_errors();

        // Assert
        for t in 0..3 {
            assert_relative_eq!(cov[[t, t]], errors[t] * errors[t], epsilon = 1e-14);
        }
        assert_relative_eq!(cov[[0, 2]], cov[[2, 0]], epsilon = 1e-16);
    }

    #[test]
    // Purpose
    // -------
    // Check the 1/(N(N−1)) normalization on a hand-computable case.
    //
    // Given
    // -----
    // - Two configurations, times {0, 1}: rows [0, 0] and [2, 4].
    //
    // Expect
    // ------
    // - deviations ±[1, 2]; C = 1/2 · (2 · [1 2; 2 4]) = [1 2; 2 4].
    fn normalization_is_covariance_of_the_mean() {
        let cor = correlator(&[&[0.0, 0.0], &[2.0, 4.0]]);

        let cov = covariance_matrix(&cor, 0, 2).unwrap();

        assert_relative_eq!(cov[[0, 0]], 1.0, epsilon = 1e-15);
        assert_relative_eq!(cov[[0, 1]], 2.0, epsilon = 1e-15);
        assert_relative_eq!(cov[[1, 1]], 4.0, epsilon = 1e-15);
    }

    #[test]
    fn window_and_config_count_are_validated() {
        let cor = correlator(&[&[1.0, 2.0], &[2.0, 3.0]]);
        let single = correlator(&[&[1.0, 2.0]]);

        assert_eq!(covariance_matrix(&cor, 1, 1).unwrap_err(), CovError::EmptyWindow { tmin: 1, tmax: 1 });
        assert_eq!(covariance_matrix(&cor, 0, 3).unwrap_err(), CovError::TimeOutOfRange { time: 2 });
        assert_eq!(covariance_matrix(&single, 0, 2).unwrap_err(), CovError::TooFewConfigs { found: 1 });
    }
}
