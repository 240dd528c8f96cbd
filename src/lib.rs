//! lattice_correlators — jackknife statistics and correlated bootstrap fits
//! for lattice correlator data.
//!
//! Purpose
//! -------
//! Serve as the crate root for analysing Monte-Carlo measurements indexed by
//! gauge configuration and Euclidean time: store them, form vacuum-subtracted
//! correlators with jackknife errors and effective masses, and fit model
//! functions with covariance-weighted chi-square minimization and bootstrap
//! error estimates.
//!
//! Key behaviors
//! -------------
//! - [`series`]: `IndexedSeries<T>` (rectangular configuration × time table
//!   with compensated reductions and jackknife statistics) and `Correlator`.
//! - [`covariance`]: covariance of the mean over a window and its most
//!   accurate inverse.
//! - [`resampling`]: bootstrap replicas of correlators driven by a caller
//!   supplied `Rng`.
//! - [`optimization`]: Levenberg–Marquardt and Nelder–Mead minimizers with a
//!   shared error type.
//! - [`fit`]: fit models, the correlated bootstrap fitter, quality of fit
//!   and tmin scans.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every configuration of a series holds the same set of times; ragged
//!   input is rejected at construction.
//! - Configuration and time labels are non-negative integers kept in
//!   ascending order.
//! - Randomness enters only through the `Rng` handed to resampling and
//!   fitting; results are reproducible for a fixed seed.
//!
//! Conventions
//! -----------
//! - Every fallible public routine returns its module's `Result` alias
//!   (`SeriesResult`, `CovResult`, `OptResult`, `FitResult`); nothing panics
//!   on bad input.
//! - Diagnostics go through the `log` facade; install any logger to see
//!   them.
//!
//! Testing notes
//! -------------
//! - Unit tests live in each module; `tests/` holds end-to-end fits on
//!   synthetic correlators.
pub mod covariance;
pub mod fit;
pub mod optimization;
pub mod resampling;
pub mod series;
pub mod utils;

pub use fit::{fit, scan_tmin, FitError, FitModel, FitOptions, FitOutcome, FitWindow};
pub use series::{Correlator, IndexedSeries, SeriesError};
