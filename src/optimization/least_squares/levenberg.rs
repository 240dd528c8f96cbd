//! least_squares::levenberg — damped Gauss–Newton (Levenberg–Marquardt).
//!
//! Purpose
//! -------
//! Minimize `½‖r(θ)‖²` for a [`ResidualModel`]. Used to produce the
//! uncorrelated seed of every fit, so robustness from poor starting guesses
//! matters more than raw speed.
//!
//! Key behaviors
//! -------------
//! - Each iteration linearizes `r` with a finite-difference Jacobian and
//!   solves the Marquardt-scaled normal equations
//!   `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr` (Cholesky, LU fallback).
//! - Accepted steps divide `λ` by 10, rejected steps multiply it by 10;
//!   non-finite trial residuals count as rejections.
//! - Convergence on gradient, relative cost reduction or relative step size
//!   (see [`LMTolerances`](super::traits::LMTolerances)).
//! - A tolerance stop only counts as converged when the residuals determine
//!   every parameter at the stopping point.
//!
//! Failure modes
//! -------------
//! - Budget: [`OptError::MaxEvaluations`] once `max_evals` residual
//!   evaluations are spent.
//! - Damping blow-up: [`OptError::DampingExhausted`] when `λ` passes `1e16`.
//! - Degenerate stop: [`OptError::RankDeficientJacobian`] or
//!   [`OptError::UndeterminedParameter`] when the solver stalls along a flat
//!   direction (e.g. a second exponential fitted to pure noise).
//! - Invalid starting point: non-finite initial residuals are an error, not a
//!   rejected step.
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::{
        jacobian::residual_jacobian,
        traits::{LMOptions, LMOutcome, LMTermination, ResidualModel},
    },
    types::{Jacobian, Residuals, Theta},
    validation::{validate_residuals, validate_theta_hat},
};
use crate::utils::{to_array1, to_dmatrix, to_dvector};
use argmin_math::ArgminL2Norm;
use log::trace;
use ndarray::Array2;
use std::cell::Cell;

const DAMPING_FACTOR: f64 = 10.0;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;
/// Floor for Marquardt scaling of parameters the residuals barely depend on.
const DIAG_FLOOR: f64 = 1e-12;
/// Largest accepted standard error at the stopping point, in units of
/// `max(|θ_j|, 1)`.
const MAX_RELATIVE_ERROR: f64 = 1.0;

/// Minimize `½‖r(θ)‖²` starting from `theta0`.
///
/// # Errors
/// - Propagates `f.check` and any model error.
/// - [`OptError::Underdetermined`] when `r` is shorter than `θ`.
/// - [`OptError::NonFiniteResidual`] when `r(θ₀)` is not finite.
/// - [`OptError::MaxEvaluations`] / [`OptError::DampingExhausted`] on
///   non-convergence.
/// - [`OptError::RankDeficientJacobian`] / [`OptError::UndeterminedParameter`]
///   when a tolerance is met at a point the residuals do not determine.
pub fn least_squares<F: ResidualModel>(
    f: &F, theta0: Theta, data: &F::Data, opts: &LMOptions,
) -> OptResult<LMOutcome> {
    f.check(&theta0, data)?;
    let evals = Cell::new(0usize);
    let eval = |theta: &Theta| -> OptResult<Residuals> {
        evals.set(evals.get() + 1);
        f.residuals(theta, data)
    };

    let mut theta = theta0;
    let mut r = eval(&theta)?;
    let m = r.len();
    let n = theta.len();
    if m < n {
        return Err(OptError::Underdetermined { residuals: m, params: n });
    }
    validate_residuals(&r, m)?;
    let mut cost = 0.5 * r.dot(&r);
    let mut lambda = opts.initial_damping;
    let mut iterations = 0usize;

    loop {
        if cost == 0.0 {
            return finish(theta, &r, None, LMTermination::ExactFit, iterations, evals.get());
        }
        if evals.get() >= opts.max_evals {
            return Err(OptError::MaxEvaluations { evaluations: evals.get() });
        }
        iterations += 1;

        let jac = residual_jacobian(f, &theta, data, m, &evals)?;
        let jtj = jac.t().dot(&jac);
        let grad = jac.t().dot(&r);

        if let Some(tol) = opts.tols.tol_grad {
            let grad_inf = grad.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if grad_inf <= tol {
                return finish(theta, &r, Some(&jac), LMTermination::GradientTolerance, iterations, evals.get());
            }
        }

        loop {
            if evals.get() >= opts.max_evals {
                return Err(OptError::MaxEvaluations { evaluations: evals.get() });
            }
            let Some(delta) = damped_step(&jtj, &grad, lambda) else {
                lambda = raise(lambda)?;
                continue;
            };
            if let Some(tol) = opts.tols.tol_x {
                if delta.l2_norm() <= tol * (theta.l2_norm() + tol) {
                    return finish(theta, &r, Some(&jac), LMTermination::StepTolerance, iterations, evals.get());
                }
            }

            let candidate = &theta + &delta;
            let trial = eval(&candidate)?;
            let trial_cost = match validate_residuals(&trial, m) {
                Ok(()) => 0.5 * trial.dot(&trial),
                Err(_) => f64::INFINITY,
            };
            trace!("LM iter {iterations}: lambda {lambda:e}, cost {cost:e} -> {trial_cost:e}");

            if trial_cost < cost {
                let previous = cost;
                theta = candidate;
                r = trial;
                cost = trial_cost;
                lambda = (lambda / DAMPING_FACTOR).max(MIN_DAMPING);
                if let Some(tol) = opts.tols.tol_f {
                    if previous - cost <= tol * previous {
                        let last = residual_jacobian(f, &theta, data, m, &evals)?;
                        return finish(theta, &r, Some(&last), LMTermination::FunctionTolerance, iterations, evals.get());
                    }
                }
                break;
            }
            lambda = raise(lambda)?;
        }
    }
}

/// `jac` is the Jacobian at `theta`; `None` skips the determinacy check.
fn finish(
    theta: Theta, r: &Residuals, jac: Option<&Jacobian>, termination: LMTermination, iterations: usize,
    evaluations: usize,
) -> OptResult<LMOutcome> {
    let theta_hat = validate_theta_hat(Some(theta))?;
    let sum_squares = r.dot(r);
    if let Some(jac) = jac {
        check_determined(jac, &theta_hat, sum_squares)?;
    }
    Ok(LMOutcome { theta_hat, sum_squares, termination, iterations, evaluations })
}

/// Reject a stopping point the residuals do not pin down.
///
/// Standard errors come from the linearized covariance `s²·(JᵀJ)⁻¹` with
/// `s² = ‖r‖²/(m − n)`. Square problems carry no residual variance and are
/// accepted as is.
fn check_determined(jac: &Jacobian, theta: &Theta, sum_squares: f64) -> OptResult<()> {
    let (m, n) = jac.dim();
    if m <= n {
        return Ok(());
    }
    let s2 = sum_squares / (m - n) as f64;
    let inverse = nalgebra::Cholesky::new(to_dmatrix(&jac.t().dot(jac)))
        .ok_or(OptError::RankDeficientJacobian)?
        .inverse();
    for (index, &value) in theta.iter().enumerate() {
        let std_error = (s2 * inverse[(index, index)]).sqrt();
        if std_error.is_nan() || std_error > MAX_RELATIVE_ERROR * value.abs().max(1.0) {
            trace!("LM stop: parameter {index} = {value} with standard error {std_error:e}");
            return Err(OptError::UndeterminedParameter { index, value, std_error });
        }
    }
    Ok(())
}

fn raise(lambda: f64) -> OptResult<f64> {
    let next = lambda * DAMPING_FACTOR;
    if next > MAX_DAMPING {
        return Err(OptError::DampingExhausted { lambda: next });
    }
    Ok(next)
}

/// Solve `(JᵀJ + λ·D) δ = −g` with `D = diag(max(JᵀJ_ii, floor))`.
fn damped_step(jtj: &Array2<f64>, grad: &Theta, lambda: f64) -> Option<Theta> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[[i, i]] += lambda * jtj[[i, i]].max(DIAG_FLOOR);
    }
    let a = to_dmatrix(&a);
    let b = -to_dvector(grad);
    let solution = match nalgebra::Cholesky::new(a.clone()) {
        Some(chol) => Some(chol.solve(&b)),
        None => a.lu().solve(&b),
    }?;
    let delta = to_array1(&solution);
    delta.iter().all(|d| d.is_finite()).then_some(delta)
}
