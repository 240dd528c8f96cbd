//! simplex — Nelder–Mead minimization through argmin.
//!
//! - [`traits`]: `Objective`, `SimplexOptions`, `OptimOutcome`.
//! - [`adapter`]: `ArgMinAdapter`, the `CostFunction` bridge.
//! - [`builders`]: initial simplex and solver construction.
//! - [`run`]: `run_nelder_mead` and the strict `minimize` entry point.
pub mod adapter;
pub mod builders;
pub mod run;
pub mod traits;

pub use run::minimize;
pub use traits::{Objective, OptimOutcome, SimplexOptions};
