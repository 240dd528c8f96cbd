//! Execution helpers that run argmin's Nelder–Mead on an [`Objective`] and
//! return a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex::{
        adapter::ArgMinAdapter,
        builders::build_simplex_solver,
        traits::{Objective, OptimOutcome, SimplexOptions},
    },
    types::{Simplex, Theta},
    validation::validate_theta0,
};
use argmin::core::{Executor, State};
use log::debug;

/// Run a configured Nelder–Mead solver on `problem`.
///
/// Wires up the adapter, the optional terminal observer (behind the
/// `obs_slog` feature, when `opts.verbose`) and the iteration budget, then
/// converts the final state into an [`OptimOutcome`]. The outcome is
/// returned whether or not the tolerance was met; see [`minimize`] for the
/// strict variant.
///
/// # Errors
/// - Propagates any `argmin` runtime error, including objective errors
///   raised inside the adapter, via `From<argmin::core::Error>`.
/// - Propagates validation errors from [`OptimOutcome::new`].
pub fn run_nelder_mead<'a, F>(
    opts: &SimplexOptions, problem: ArgMinAdapter<'a, F>, solver: Simplex,
) -> OptResult<OptimOutcome>
where
    F: Objective,
{
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    let max_iter = opts.max_iter as u64;
    optimizer = optimizer.configure(|state| state.max_iters(max_iter));

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}

/// Minimize `f` from `theta0` and require tolerance-based convergence.
///
/// # Behavior
/// - Validates `theta0` and calls `f.check(theta0, data)`.
/// - Builds the initial simplex around `theta0`.
/// - Runs Nelder–Mead; any termination other than meeting the spread
///   tolerance (iteration budget, interrupt, solver exit) is an error.
///
/// # Errors
/// - [`OptError::AbnormalTermination`] when the run ended without
///   converging.
/// - Propagates errors from `f.check`, the builder and the runner.
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &SimplexOptions,
) -> OptResult<OptimOutcome> {
    validate_theta0(&theta0, theta0.len())?;
    f.check(&theta0, data)?;
    let solver = build_simplex_solver(&theta0, opts)?;
    let problem = ArgMinAdapter::new(f, data);
    let outcome = run_nelder_mead(opts, problem, solver)?;
    debug!(
        "Nelder-Mead finished after {} iterations: {} (cost {:e})",
        outcome.iterations, outcome.status, outcome.value
    );
    if !outcome.converged {
        return Err(OptError::AbnormalTermination {
            status: outcome.status,
            iterations: outcome.iterations,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    // Scope
    // -----
    // Convergence on a smooth quadratic, iteration-budget failure, and
    // propagation of objective errors.
    use super::*;
    use crate::optimization::types::Cost;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    /// c(θ) = Σ w_i (θ_i − c_i)² + 1.
    struct Bowl;

    impl Objective for Bowl {
        type Data = (Array1<f64>, Array1<f64>);

        fn value(&self, theta: &Theta, (center, weights): &Self::Data) -> OptResult<Cost> {
            let d = theta - center;
            Ok((&d * &d * weights).sum() + 1.0)
        }

        fn check(&self, theta: &Theta, (center, _): &Self::Data) -> OptResult<()> {
            validate_theta0(theta, center.len())
        }
    }

    struct Explodes;

    impl Objective for Explodes {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok((1000.0 * theta[0]).exp())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Nelder–Mead finds the minimum of an anisotropic quadratic bowl.
    //
    // Given
    // -----
    // - center (1, −2, 0.5), weights (1, 10, 0.1), θ₀ = (0.1, 0.1, 0.1).
    //
    // Expect
    // ------
    // - converged, θ̂ within 1e-2 of the center, cost ≈ 1.
    fn converges_to_bowl_minimum() {
        // Arrange
        let data = (array![1.0, -2.0, 0.5], array![1.0, 10.0, 0.1]);
        let opts = SimplexOptions::new(1e-12, 20_000, 0.05, 0.00025, false).unwrap();

        // Act
        let out = minimize(&Bowl, array![0.1, 0.1, 0.1], &data, &opts).unwrap();

        // Assert
        assert!(out.converged);
        for (got, want) in out.theta_hat.iter().zip(data.0.iter()) {
            assert!((got - want).abs() < 1e-2, "{got} vs {want}");
        }
        assert_relative_eq!(out.value, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn iteration_budget_is_abnormal_termination() {
        let data = (array![1.0, -2.0], array![1.0, 1.0]);
        let opts = SimplexOptions::new(1e-14, 3, 0.05, 0.00025, false).unwrap();

        let err = minimize(&Bowl, array![10.0, 10.0], &data, &opts).unwrap_err();

        assert!(matches!(err, OptError::AbnormalTermination { iterations: 3, .. }));
    }

    #[test]
    // Purpose
    // -------
    // An objective that overflows aborts the run with `NonFiniteCost`.
    //
    // Given
    // -----
    // - c(θ) = exp(1000 θ) from θ₀ = 1.
    //
    // Expect
    // ------
    // - `OptError::NonFiniteCost`, recovered through the argmin error.
    fn overflowing_objective_is_reported() {
        let err = minimize(&Explodes, array![1.0], &(), &SimplexOptions::default()).unwrap_err();

        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }
}
