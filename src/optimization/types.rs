//! optimization::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types used by both optimizers so the rest of the
//! code stays agnostic to `ndarray` and argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` and `Residuals` are column vectors; `Jacobian` is
//!   `residuals × params` (row `i` is `∂r_i/∂θ`).
//! - `Cost` is always a scalar to be *minimized*.
use argmin::solver::neldermead::NelderMead;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Residual vector `r(θ)` of a least-squares problem.
pub type Residuals = Array1<f64>;

/// Dense Jacobian `∂r/∂θ`, shape `residuals × params`.
pub type Jacobian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead specialized to this crate's numeric types.
pub type Simplex = NelderMead<Theta, Cost>;
