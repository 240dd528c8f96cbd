//! Public API surface for nonlinear least squares.
//!
//! - [`ResidualModel`]: trait users implement for their problem.
//! - [`LMOptions`] and [`LMTolerances`]: configuration for the solver.
//! - [`LMOutcome`]: normalized result of a converged run.
//!
//! Convention: the solver minimizes `½‖r(θ)‖²`; [`LMOutcome::sum_squares`]
//! reports the plain `‖r(θ̂)‖²`.
use crate::optimization::{
    errors::{OptError, OptResult},
    types::{Residuals, Theta},
    validation::{verify_step, verify_tol_f, verify_tol_grad, verify_tol_x},
};

/// User-implemented residual interface.
///
/// - `type Data`: per-problem data carried into `residuals`/`check`.
///
/// Required:
/// - `residuals(&Theta, &Data) -> OptResult<Residuals>`: evaluate `r(θ)`.
///   The length must not depend on `θ`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
pub trait ResidualModel {
    type Data;

    fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<Residuals>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Convergence tolerances of the Levenberg–Marquardt solver.
///
/// - `tol_grad`: stop when `‖Jᵀr‖∞` falls below this threshold.
/// - `tol_f`: stop when an accepted step reduces the cost by less than
///   `tol_f · cost`.
/// - `tol_x`: stop when the proposed step satisfies
///   `‖δ‖ ≤ tol_x · (‖θ‖ + tol_x)`.
///
/// Any field can be `None` but **at least one** must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMTolerances {
    pub tol_grad: Option<f64>,
    pub tol_f: Option<f64>,
    pub tol_x: Option<f64>,
}

impl LMTolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolF`] /
    ///   [`OptError::InvalidTolX`] for non-finite or non-positive values.
    pub fn new(tol_grad: Option<f64>, tol_f: Option<f64>, tol_x: Option<f64>) -> OptResult<Self> {
        if tol_grad.is_none() && tol_f.is_none() && tol_x.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_f(tol_f)?;
        verify_tol_x(tol_x)?;
        Ok(Self { tol_grad, tol_f, tol_x })
    }
}

/// Solver configuration.
///
/// Default:
/// - `tols`: `tol_grad = None`, `tol_f = 1.49012e-8`, `tol_x = 1.49012e-8`
/// - `max_evals`: 10 000 residual evaluations (Jacobian columns included)
/// - `initial_damping`: `1e-3`
#[derive(Debug, Clone, PartialEq)]
pub struct LMOptions {
    pub tols: LMTolerances,
    pub max_evals: usize,
    pub initial_damping: f64,
}

impl LMOptions {
    pub fn new(tols: LMTolerances, max_evals: usize, initial_damping: f64) -> OptResult<Self> {
        if max_evals == 0 {
            return Err(OptError::InvalidMaxEvals {
                max_evals,
                reason: "Evaluation budget must be greater than zero.",
            });
        }
        verify_step(initial_damping, "Initial damping must be finite and positive.")?;
        Ok(Self { tols, max_evals, initial_damping })
    }
}

impl Default for LMOptions {
    fn default() -> Self {
        Self {
            tols: LMTolerances { tol_grad: None, tol_f: Some(1.49012e-8), tol_x: Some(1.49012e-8) },
            max_evals: 10_000,
            initial_damping: 1e-3,
        }
    }
}

/// Which convergence test ended a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LMTermination {
    /// Residuals vanish exactly.
    ExactFit,
    GradientTolerance,
    FunctionTolerance,
    StepTolerance,
}

/// Result of a converged Levenberg–Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LMOutcome {
    pub theta_hat: Theta,
    pub sum_squares: f64,
    pub termination: LMTermination,
    pub iterations: usize,
    /// Residual evaluations, including those spent on Jacobians.
    pub evaluations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Option constructors enforce the same rules as the defaults satisfy.
    //
    // Given
    // -----
    // - All-`None` tolerances, a zero budget, a negative damping and the
    //   default options.
    //
    // Expect
    // ------
    // - Errors for the invalid inputs; defaults rebuild through `new`.
    fn options_are_validated() {
        assert_eq!(LMTolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));

        let tols = LMTolerances::new(None, Some(1e-8), None).unwrap();
        assert!(matches!(LMOptions::new(tols, 0, 1e-3), Err(OptError::InvalidMaxEvals { .. })));
        assert!(matches!(LMOptions::new(tols, 10, -1.0), Err(OptError::InvalidStep { .. })));

        let d = LMOptions::default();
        let rebuilt = LMOptions::new(
            LMTolerances::new(d.tols.tol_grad, d.tols.tol_f, d.tols.tol_x).unwrap(),
            d.max_evals,
            d.initial_damping,
        )
        .unwrap();
        assert_eq!(rebuilt, d);
    }
}
