//! fit — correlated bootstrap fits of correlator models.
//!
//! Purpose
//! -------
//! Turn an averaged correlator into parameter estimates with bootstrap
//! errors and a goodness-of-fit score, and scan how those estimates move
//! with the start of the fit window.
//!
//! Key behaviors
//! -------------
//! - [`models`]: the [`FitModel`] trait and the built-in forms (`cosh`,
//!   `single_exp`, `periodic_exp`, `two_exp`, `cosh_const`).
//! - [`fitter`]: `fit(model, correlator, window, options, rng)` running the
//!   LM → Nelder–Mead chain on the data and on every bootstrap replica.
//! - [`quality`]: `quality_of_fit(dof, chi_square)`.
//! - [`tmin`]: `scan_tmin` over window starts for one parameter.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fit windows are inclusive and must leave at least one degree of
//!   freedom.
//! - Results are reproducible for a fixed `Rng` seed, independent of the
//!   rayon thread count.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; `tests/integration_fit_pipeline.rs`
//!   runs the two-exponential recovery end to end.
pub mod errors;
pub mod fitter;
pub mod models;
pub mod objective;
pub mod options;
pub mod outcome;
pub mod quality;
pub mod tmin;

pub use errors::{FitError, FitResult, FitStage};
pub use fitter::{fit, inverse_covariance};
pub use models::{build_model, with_guess, FitModel, ModelKind, WithGuess};
pub use options::{FitOptions, FitWindow, ReplicaCovariance};
pub use outcome::{FitOutcome, ParameterSet};
pub use quality::quality_of_fit;
pub use tmin::{scan_tmin, TminPoint};
