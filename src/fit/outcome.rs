//! fit::outcome — named parameter vectors and the result of a fit.
use std::fmt;

use super::errors::{FitError, FitResult};
use super::options::FitWindow;
use crate::optimization::types::Theta;

/// Parameter values labelled with the model's parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    names: Vec<&'static str>,
    values: Theta,
}

impl ParameterSet {
    pub(crate) fn new(names: &[&'static str], values: Theta) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names: names.to_vec(), values }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn values(&self) -> &Theta {
        &self.values
    }

    /// Value of parameter `name`, if the model has one.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.values[i])
    }

    /// Index of parameter `name`.
    ///
    /// # Errors
    /// [`FitError::UnknownParameter`] if the model has no such parameter.
    pub fn index_of(&self, name: &str) -> FitResult<usize> {
        self.position(name).ok_or_else(|| FitError::UnknownParameter { name: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| *n == name)
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value:.6}")?;
        }
        Ok(())
    }
}

/// Result of a correlated bootstrap fit.
///
/// - `point_estimate`: correlated fit to the original data.
/// - `uncorrelated_estimate`: its Levenberg–Marquardt seed.
/// - `bootstrap_mean` / `bootstrap_variance`: mean and population variance
///   of the replica estimates.
/// - `replicas`: per-replica correlated estimates in draw order.
/// - `chi_square`: correlated χ² at `point_estimate`, weighted by the
///   inverse covariance of the original data.
/// - `quality`: probability of a χ² at least this large with
///   `degrees_of_freedom`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub model: String,
    pub window: FitWindow,
    pub point_estimate: ParameterSet,
    pub uncorrelated_estimate: ParameterSet,
    pub bootstrap_mean: ParameterSet,
    pub bootstrap_variance: ParameterSet,
    pub replicas: Vec<Theta>,
    pub chi_square: f64,
    pub degrees_of_freedom: usize,
    pub quality: f64,
}

impl FitOutcome {
    /// Square roots of the bootstrap variances.
    pub fn bootstrap_errors(&self) -> ParameterSet {
        ParameterSet {
            names: self.bootstrap_variance.names.clone(),
            values: self.bootstrap_variance.values.mapv(f64::sqrt),
        }
    }

    pub fn chi_square_per_dof(&self) -> f64 {
        self.chi_square / self.degrees_of_freedom as f64
    }
}

impl fmt::Display for FitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.bootstrap_errors();
        writeln!(f, "{} fit on {}:", self.model, self.window)?;
        for ((name, value), (_, err)) in self.point_estimate.iter().zip(errors.iter()) {
            writeln!(f, "  {name} = {value:.6} ± {err:.6}")?;
        }
        write!(
            f,
            "  chi^2/dof = {:.4} / {} = {:.4}, Q = {:.4}",
            self.chi_square,
            self.degrees_of_freedom,
            self.chi_square_per_dof(),
            self.quality
        )
    }
}
