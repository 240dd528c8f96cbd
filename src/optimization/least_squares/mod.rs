//! least_squares — Levenberg–Marquardt for nonlinear least squares.
//!
//! - [`traits`]: `ResidualModel`, `LMOptions`, `LMTolerances`, `LMOutcome`.
//! - [`jacobian`]: finite-difference Jacobians with error capture.
//! - [`levenberg`]: the damped Gauss–Newton solver `least_squares`.
pub mod jacobian;
pub mod levenberg;
pub mod traits;

pub use levenberg::least_squares;
pub use traits::{LMOptions, LMOutcome, LMTermination, LMTolerances, ResidualModel};
