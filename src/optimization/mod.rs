//! optimization — the two minimizers behind every fit, and their error surface.
//!
//! Purpose
//! -------
//! Provide the numerical minimization layer used by the fitter: a
//! Levenberg–Marquardt solver for unweighted least squares and an
//! argmin-backed Nelder–Mead runner for the correlated chi-square. Callers
//! implement a small trait for their problem, choose options, and receive a
//! validated outcome without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - `least_squares`: damped Gauss–Newton on residual vectors with
//!   finite-difference Jacobians (`finitediff`), Marquardt scaling and
//!   explicit budget / damping failure modes.
//! - `simplex`: derivative-free minimization of a scalar cost through
//!   `argmin::solver::neldermead::NelderMead`, with a strict entry point that
//!   turns any non-converged termination into an error.
//! - Normalize configuration issues, numerical failures and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are unconstrained `f64` vectors (`types::Theta`).
//! - Objectives report domain problems as `OptError`, never by panicking.
//! - A returned outcome always has finite parameters and a finite cost.
//!
//! Conventions
//! -----------
//! - Both solvers *minimize*.
//! - Public entry points that can fail return `OptResult<T>`; callers never
//!   see raw argmin errors.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules cover option validation, Jacobian
//!   orientation, convergence on toy problems and every failure mode.
pub mod errors;
pub mod least_squares;
pub mod simplex;
pub mod types;
pub mod validation;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use lattice_correlators::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::least_squares::{
        least_squares, LMOptions, LMOutcome, LMTermination, LMTolerances, ResidualModel,
    };
    pub use super::simplex::{minimize, Objective, OptimOutcome, SimplexOptions};
    pub use super::types::{Cost, FnEvalMap, Jacobian, Residuals, Theta};
}
