//! least_squares::jacobian — finite-difference Jacobians of residual vectors.
//!
//! Purpose
//! -------
//! Approximate `J = ∂r/∂θ` for a [`ResidualModel`] with `finitediff`, while
//! routing model errors out of the non-fallible difference closure.
//!
//! Key behaviors
//! -------------
//! - Central differences first; forward differences when the central pass
//!   captured an error or produced a non-finite entry.
//! - `finitediff` lays out ndarray Jacobians as `params × residuals`
//!   (`out[(i, j)] = ∂r_j/∂θ_i`); both passes are transposed to
//!   `residuals × params` before validation.
//! - Every residual evaluation is counted in the caller's budget cell.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned Jacobians satisfy [`validate_jacobian`] with shape
//!   `n_residuals × theta.len()`.
//! - Model errors raised inside the closure are stored in `closure_err` and
//!   surface as the function's error; the closure itself returns `NaN`s.
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::traits::ResidualModel,
    types::{Jacobian, Residuals, Theta},
    validation::validate_jacobian,
};
use finitediff::FiniteDiff;
use std::cell::{Cell, RefCell};

/// Finite-difference Jacobian with error capture and validation.
///
/// Parameters
/// ----------
/// - `f`, `data`: the residual model and its data.
/// - `theta`: point of linearization.
/// - `n_residuals`: length of `r(θ)`, known from the caller's base evaluation.
/// - `evals`: running count of residual evaluations.
///
/// Errors
/// ------
/// - The first model error captured during either difference pass.
/// - `OptError::InvalidJacobian` / `OptError::JacobianDimMismatch` when the
///   forward fallback also fails validation.
pub fn residual_jacobian<F: ResidualModel>(
    f: &F, theta: &Theta, data: &F::Data, n_residuals: usize, evals: &Cell<usize>,
) -> OptResult<Jacobian> {
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let residuals = |x: &Theta| -> Residuals {
        evals.set(evals.get() + 1);
        match f.residuals(x, data) {
            Ok(r) if r.len() == n_residuals => r,
            Ok(r) => {
                record(&closure_err, OptError::ResidualDimMismatch { expected: n_residuals, found: r.len() });
                Residuals::from_elem(n_residuals, f64::NAN)
            }
            Err(e) => {
                record(&closure_err, e);
                Residuals::from_elem(n_residuals, f64::NAN)
            }
        }
    };

    let central: Jacobian = theta.central_jacobian(&residuals).reversed_axes();
    if closure_err.borrow().is_none() && validate_jacobian(&central, n_residuals, theta.len()).is_ok() {
        return Ok(central);
    }

    closure_err.replace(None);
    let forward: Jacobian = theta.forward_jacobian(&residuals).reversed_axes();
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_jacobian(&forward, n_residuals, theta.len())?;
    Ok(forward)
}

fn record(slot: &RefCell<Option<OptError>>, err: OptError) {
    let mut slot = slot.borrow_mut();
    if slot.is_none() {
        *slot = Some(err);
    }
}
