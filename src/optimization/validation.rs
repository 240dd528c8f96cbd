//! Validation helpers shared by the least-squares and simplex optimizers.
//!
//! - **Tolerance checks**: [`verify_positive`] and its wrappers ensure numeric
//!   tolerances are finite and strictly positive when provided.
//! - **Inputs**: [`validate_theta0`] rejects non-finite starting points.
//! - **Residuals / Jacobians**: dimension and finiteness checks.
//! - **Outcomes**: [`validate_theta_hat`] and [`validate_value`].
use crate::optimization::{
    errors::{OptError, OptResult},
    types::{Jacobian, Residuals, Theta},
};

fn verify_positive(
    tol: Option<f64>, make: impl Fn(f64, &'static str) -> OptError,
) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(make(tol, "Tolerance must be finite."));
        }
        if tol <= 0.0 {
            return Err(make(tol, "Tolerance must be positive."));
        }
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    verify_positive(tol, |tol, reason| OptError::InvalidTolGrad { tol, reason })
}

/// # Errors
/// Returns [`OptError::InvalidTolF`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_f(tol: Option<f64>) -> OptResult<()> {
    verify_positive(tol, |tol, reason| OptError::InvalidTolF { tol, reason })
}

/// # Errors
/// Returns [`OptError::InvalidTolX`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_x(tol: Option<f64>) -> OptResult<()> {
    verify_positive(tol, |tol, reason| OptError::InvalidTolX { tol, reason })
}

/// # Errors
/// Returns [`OptError::InvalidTolSpread`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_spread(tol: f64) -> OptResult<()> {
    verify_positive(Some(tol), |tol, reason| OptError::InvalidTolSpread { tol, reason })
}

/// Steps (initial damping, simplex offsets) must be finite and positive.
pub fn verify_step(value: f64, reason: &'static str) -> OptResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(OptError::InvalidStep { value, reason });
    }
    Ok(())
}

/// Starting point must be non-empty and finite.
pub fn validate_theta0(theta0: &Theta, expected: usize) -> OptResult<()> {
    if theta0.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta0.len() });
    }
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

/// Validate a residual vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::ResidualDimMismatch`] if the length differs from `dim`.
/// - [`OptError::NonFiniteResidual`] for the first offending entry.
pub fn validate_residuals(residuals: &Residuals, dim: usize) -> OptResult<()> {
    if residuals.len() != dim {
        return Err(OptError::ResidualDimMismatch { expected: dim, found: residuals.len() });
    }
    for (index, &value) in residuals.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::NonFiniteResidual { index, value });
        }
    }
    Ok(())
}

/// Validate the shape (`rows × cols`) and entries of a Jacobian.
pub fn validate_jacobian(jacobian: &Jacobian, rows: usize, cols: usize) -> OptResult<()> {
    if jacobian.dim() != (rows, cols) {
        return Err(OptError::JacobianDimMismatch { expected: (rows, cols), found: jacobian.dim() });
    }
    for ((i, j), &value) in jacobian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidJacobian { row: i, col: j, value });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
