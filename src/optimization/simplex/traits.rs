//! Public API surface for derivative-free minimization.
//!
//! - [`Objective`]: trait users implement for a scalar cost.
//! - [`SimplexOptions`]: configuration for the Nelder–Mead runner.
//! - [`OptimOutcome`]: normalized result returned by the high-level
//!   [`minimize`](super::run::minimize) API.
use crate::optimization::{
    errors::{OptError, OptResult},
    types::{Cost, FnEvalMap, Theta},
    validation::{validate_theta_hat, validate_value, verify_step, verify_tol_spread},
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented scalar objective, minimized by the simplex runner.
///
/// - `type Data`: per-problem data carried into `value`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate the cost.
///   Non-finite values abort the run with `OptError::NonFiniteCost`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook called once
///   before optimization.
pub trait Objective {
    type Data;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Nelder–Mead configuration.
///
/// Fields:
/// - `tol_spread`: stop when the standard deviation of the cost over the
///   simplex vertices falls below this value.
/// - `max_iter`: iteration budget; reaching it is a convergence failure.
/// - `rel_step`: relative offset of each initial vertex along its axis.
/// - `zero_step`: absolute offset used for coordinates equal to zero.
/// - `verbose`: attach the terminal observer (behind the `obs_slog` feature).
///
/// Default:
/// - `tol_spread = 1e-7`, `max_iter = 50_000`, `rel_step = 0.05`,
///   `zero_step = 0.00025`, `verbose = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub tol_spread: f64,
    pub max_iter: usize,
    pub rel_step: f64,
    pub zero_step: f64,
    pub verbose: bool,
}

impl SimplexOptions {
    /// Create validated simplex options.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolSpread`] for non-finite or non-positive
    ///   `tol_spread`.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    /// - [`OptError::InvalidStep`] for non-finite or non-positive steps.
    pub fn new(
        tol_spread: f64, max_iter: usize, rel_step: f64, zero_step: f64, verbose: bool,
    ) -> OptResult<Self> {
        verify_tol_spread(tol_spread)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        verify_step(rel_step, "Relative simplex step must be finite and positive.")?;
        verify_step(zero_step, "Zero-coordinate simplex step must be finite and positive.")?;
        Ok(Self { tol_spread, max_iter, rel_step, zero_step, verbose })
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self { tol_spread: 1e-7, max_iter: 50_000, rel_step: 0.05, zero_step: 0.00025, verbose: false }
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best cost.
/// - `converged`: `true` only if the solver met its own tolerance
///   (`SolverConverged`) or a target cost.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        Ok(Self { theta_hat, value, converged, status, iterations: iterations as usize, fn_evals })
    }
}
