//! fit::options — fit window and fitter configuration.
use std::ops::RangeInclusive;

use super::errors::{FitError, FitResult};
use crate::optimization::least_squares::LMOptions;
use crate::optimization::simplex::SimplexOptions;
use crate::resampling::DEFAULT_BOOTSTRAPS;
use crate::series::Time;

/// Inclusive range of time slices `[tmin, tmax]` entering a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitWindow {
    pub tmin: Time,
    pub tmax: Time,
}

impl FitWindow {
    /// # Errors
    /// [`FitError::InvalidWindow`] if `tmin > tmax`.
    pub fn new(tmin: Time, tmax: Time) -> FitResult<Self> {
        if tmin > tmax {
            return Err(FitError::InvalidWindow { tmin, tmax });
        }
        Ok(Self { tmin, tmax })
    }

    /// Number of time slices in the window.
    pub fn len(&self) -> usize {
        self.tmax - self.tmin + 1
    }

    /// Always `false`: a window holds at least `tmin` itself.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Exclusive upper bound, as taken by `covariance_matrix`.
    pub fn end(&self) -> Time {
        self.tmax + 1
    }

    pub fn times(&self) -> RangeInclusive<Time> {
        self.tmin..=self.tmax
    }

    /// Degrees of freedom left after fitting `n_params` parameters.
    ///
    /// # Errors
    /// [`FitError::InsufficientDegreesOfFreedom`] unless the window has more
    /// points than parameters.
    pub fn degrees_of_freedom(&self, n_params: usize) -> FitResult<usize> {
        match self.len().checked_sub(n_params) {
            Some(dof) if dof >= 1 => Ok(dof),
            _ => Err(FitError::InsufficientDegreesOfFreedom { window_len: self.len(), n_params }),
        }
    }
}

impl std::fmt::Display for FitWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.tmin, self.tmax)
    }
}

/// Which inverse covariance weights the replica fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicaCovariance {
    /// Each replica estimates and inverts its own covariance.
    #[default]
    Resampled,
    /// Every replica reuses the inverse covariance of the original data.
    Reference,
}

/// Configuration of [`fit`](super::fitter::fit).
///
/// Default:
/// - `bootstraps = 100`, default LM and simplex options,
///   `replica_covariance = Resampled`, `parallel = true`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub bootstraps: usize,
    pub lm: LMOptions,
    pub simplex: SimplexOptions,
    pub replica_covariance: ReplicaCovariance,
    /// Fit replicas on the rayon pool; results are identical either way.
    pub parallel: bool,
}

impl FitOptions {
    /// # Errors
    /// [`FitError::InvalidBootstraps`] if `bootstraps == 0`.
    pub fn new(
        bootstraps: usize, lm: LMOptions, simplex: SimplexOptions, replica_covariance: ReplicaCovariance,
        parallel: bool,
    ) -> FitResult<Self> {
        if bootstraps == 0 {
            return Err(FitError::InvalidBootstraps { count: bootstraps });
        }
        Ok(Self { bootstraps, lm, simplex, replica_covariance, parallel })
    }

    /// Default options with `bootstraps` replicas.
    pub fn with_bootstraps(bootstraps: usize) -> FitResult<Self> {
        let defaults = Self::default();
        Self::new(bootstraps, defaults.lm, defaults.simplex, defaults.replica_covariance, defaults.parallel)
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            bootstraps: DEFAULT_BOOTSTRAPS,
            lm: LMOptions::default(),
            simplex: SimplexOptions::default(),
            replica_covariance: ReplicaCovariance::default(),
            parallel: true,
        }
    }
}
