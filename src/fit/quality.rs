//! fit::quality — goodness-of-fit probability.
use statrs::function::gamma::checked_gamma_ur;

use super::errors::{FitError, FitResult};

/// Probability `Q = Γ_upper(dof/2, χ²/2) / Γ(dof/2)` of observing a
/// chi-square at least as large as `chi_square` with `dof` degrees of
/// freedom.
///
/// `χ² = 0` gives exactly 1 and `χ² = +∞` gives 0; the result is clamped
/// to `[0, 1]`.
///
/// # Errors
/// - [`FitError::InvalidDegreesOfFreedom`] if `dof == 0`.
/// - [`FitError::InvalidChiSquare`] for negative or NaN `chi_square`.
/// - [`FitError::Quality`] if the incomplete gamma evaluation fails.
pub fn quality_of_fit(dof: usize, chi_square: f64) -> FitResult<f64> {
    if dof == 0 {
        return Err(FitError::InvalidDegreesOfFreedom { dof });
    }
    if chi_square.is_nan() || chi_square < 0.0 {
        return Err(FitError::InvalidChiSquare { value: chi_square });
    }
    if chi_square == 0.0 {
        return Ok(1.0);
    }
    if chi_square.is_infinite() {
        return Ok(0.0);
    }
    let q = checked_gamma_ur(dof as f64 / 2.0, chi_square / 2.0)
        .map_err(|e| FitError::Quality { text: e.to_string() })?;
    Ok(q.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Known closed forms of the chi-square survival function.
    //
    // Given
    // -----
    // - dof = 2: Q = exp(−χ²/2).
    // - χ² = dof for large dof sits near 0.5.
    //
    // Expect
    // ------
    // - Exact agreement for dof = 2 and Q ≈ 0.5 ± 0.05 for dof = 50.
    fn matches_chi_square_survival_function() {
        for chi in [0.5, 1.0, 3.0, 10.0] {
            assert_relative_eq!(quality_of_fit(2, chi).unwrap(), (-chi / 2.0f64).exp(), epsilon = 1e-12);
        }
        let q = quality_of_fit(50, 50.0).unwrap();
        assert!((q - 0.5).abs() < 0.05, "{q}");
    }

    #[test]
    fn boundary_values() {
        assert_eq!(quality_of_fit(3, 0.0).unwrap(), 1.0);
        assert_eq!(quality_of_fit(3, f64::INFINITY).unwrap(), 0.0);
        assert!(quality_of_fit(3, 1e4).unwrap() < 1e-100);
    }

    #[test]
    fn non_increasing_in_chi_square() {
        let qs: Vec<f64> = (0..40).map(|k| quality_of_fit(5, 0.5 * k as f64).unwrap()).collect();

        assert!(qs.windows(2).all(|w| w[1] <= w[0]), "{qs:?}");
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(quality_of_fit(0, 1.0), Err(FitError::InvalidDegreesOfFreedom { dof: 0 }));
        assert!(matches!(quality_of_fit(2, -1.0), Err(FitError::InvalidChiSquare { .. })));
        assert!(matches!(quality_of_fit(2, f64::NAN), Err(FitError::InvalidChiSquare { .. })));
    }
}
