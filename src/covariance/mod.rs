//! covariance — covariance of the mean and its inverse.
//!
//! - [`estimator`]: `covariance_matrix(correlator, tmin, tmax)` over `[tmin, tmax)`.
//! - [`inverse`]: `best_inverse(matrix)` choosing between LU and Cholesky.
//! - [`errors`]: `CovError` / `CovResult`.
pub mod errors;
pub mod estimator;
pub mod inverse;

pub use errors::{CovError, CovResult};
pub use estimator::covariance_matrix;
pub use inverse::{best_inverse, InverseEstimate, InverseMethod, INVERSION_TOLERANCE};
