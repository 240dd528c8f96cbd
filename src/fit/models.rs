//! fit::models — fit functions for correlator data.
//!
//! Purpose
//! -------
//! Define the [`FitModel`] contract and the built-in catalogue of functional
//! forms used for two-point correlators:
//!
//! | name           | parameters                  | formula                                        |
//! |----------------|-----------------------------|------------------------------------------------|
//! | `cosh`         | mass, amp                   | `amp · cosh(−mass · (t − Nt/2))`               |
//! | `single_exp`   | mass, amp                   | `amp · exp(−mass · t)`                         |
//! | `periodic_exp` | mass, amp                   | `amp · (exp(−mass · t) + exp(mass · (t − Nt)))`|
//! | `two_exp`      | mass, amp, mass2, amp2      | `amp · exp(−mass · t) + amp2 · exp(−mass2 · t)`|
//! | `cosh_const`   | mass, amp, const            | `amp · cosh(−mass · (t − Nt/2)) + const`       |
//!
//! Conventions
//! -----------
//! - Parameters are ordered as in the table; `FitOutcome` reports them under
//!   these names.
//! - Periodic forms (`cosh`, `periodic_exp`, `cosh_const`) need the time
//!   extent `Nt` of the lattice; [`build_model`] fails without it.
use std::str::FromStr;

use super::errors::{FitError, FitResult};
use crate::optimization::types::Theta;

/// A functional form fitted to the averaged correlator.
///
/// Implementations are shared read-only across replica threads.
pub trait FitModel: Send + Sync {
    /// Short human-readable name used in logs.
    fn description(&self) -> &str;
    fn parameter_names(&self) -> &[&'static str];
    fn starting_guess(&self) -> &[f64];
    /// Model value at time `t` for parameters `params`.
    fn formula(&self, params: &Theta, t: f64) -> f64;

    fn n_params(&self) -> usize {
        self.parameter_names().len()
    }
}

const MASS_AMP: [&str; 2] = ["mass", "amp"];
const GENERIC_GUESS: [f64; 2] = [0.1, 10.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cosh {
    pub period: usize,
}

impl FitModel for Cosh {
    fn description(&self) -> &str {
        "cosh"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &MASS_AMP
    }

    fn starting_guess(&self) -> &[f64] {
        &GENERIC_GUESS
    }

    fn formula(&self, p: &Theta, t: f64) -> f64 {
        p[1] * (-p[0] * (t - self.period as f64 / 2.0)).cosh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SingleExp;

impl FitModel for SingleExp {
    fn description(&self) -> &str {
        "exp"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &MASS_AMP
    }

    fn starting_guess(&self) -> &[f64] {
        &GENERIC_GUESS
    }

    fn formula(&self, p: &Theta, t: f64) -> f64 {
        p[1] * (-p[0] * t).exp()
    }
}

/// Forward plus backward propagating exponential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicExp {
    pub period: usize,
}

impl FitModel for PeriodicExp {
    fn description(&self) -> &str {
        "fwd-back-exp"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &MASS_AMP
    }

    fn starting_guess(&self) -> &[f64] {
        &GENERIC_GUESS
    }

    fn formula(&self, p: &Theta, t: f64) -> f64 {
        p[1] * ((-p[0] * t).exp() + (p[0] * (t - self.period as f64)).exp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TwoExp;

impl FitModel for TwoExp {
    fn description(&self) -> &str {
        "two_exp"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &["mass", "amp", "mass2", "amp2"]
    }

    // The two masses start apart; identical starting masses keep the
    // Jacobian columns equal and the fit never separates them.
    fn starting_guess(&self) -> &[f64] {
        &[0.1, 10.0, 1.0, 10.0]
    }

    fn formula(&self, p: &Theta, t: f64) -> f64 {
        p[1] * (-p[0] * t).exp() + p[3] * (-p[2] * t).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoshConst {
    pub period: usize,
}

impl FitModel for CoshConst {
    fn description(&self) -> &str {
        "cosh+const"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &["mass", "amp", "const"]
    }

    fn starting_guess(&self) -> &[f64] {
        &[0.1, 10.0, 0.0]
    }

    fn formula(&self, p: &Theta, t: f64) -> f64 {
        p[1] * (-p[0] * (t - self.period as f64 / 2.0)).cosh() + p[2]
    }
}

/// Any model with a caller-chosen starting guess.
#[derive(Debug, Clone, PartialEq)]
pub struct WithGuess<M> {
    inner: M,
    guess: Vec<f64>,
}

/// Override the starting guess of `model`.
///
/// # Errors
/// [`FitError::InvalidGuess`] if the guess length differs from the number
/// of parameters.
pub fn with_guess<M: FitModel>(model: M, guess: Vec<f64>) -> FitResult<WithGuess<M>> {
    if guess.len() != model.n_params() {
        return Err(FitError::InvalidGuess { expected: model.n_params(), found: guess.len() });
    }
    Ok(WithGuess { inner: model, guess })
}

impl<M: FitModel> FitModel for WithGuess<M> {
    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameter_names(&self) -> &[&'static str] {
        self.inner.parameter_names()
    }

    fn starting_guess(&self) -> &[f64] {
        &self.guess
    }

    fn formula(&self, params: &Theta, t: f64) -> f64 {
        self.inner.formula(params, t)
    }
}

/// Names of the built-in models.
///
/// Parsing is case-insensitive and also accepts the models' descriptions
/// (`"exp"`, `"fwd-back-exp"`, `"cosh+const"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Cosh,
    SingleExp,
    PeriodicExp,
    TwoExp,
    CoshConst,
}

impl FromStr for ModelKind {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosh" => Ok(ModelKind::Cosh),
            "single_exp" | "exp" => Ok(ModelKind::SingleExp),
            "periodic_exp" | "fwd-back-exp" => Ok(ModelKind::PeriodicExp),
            "two_exp" => Ok(ModelKind::TwoExp),
            "cosh_const" | "cosh+const" => Ok(ModelKind::CoshConst),
            _ => Err(FitError::UnknownModel {
                name: s.to_string(),
                reason: "Valid options are 'cosh', 'single_exp', 'periodic_exp', 'two_exp' or 'cosh_const'.",
            }),
        }
    }
}

impl ModelKind {
    pub fn needs_period(&self) -> bool {
        matches!(self, ModelKind::Cosh | ModelKind::PeriodicExp | ModelKind::CoshConst)
    }
}

/// Instantiate a built-in model.
///
/// # Errors
/// [`FitError::MissingPeriod`] when a periodic model gets no (or a zero)
/// period.
pub fn build_model(kind: ModelKind, period: Option<usize>) -> FitResult<Box<dyn FitModel>> {
    let period = match (kind.needs_period(), period) {
        (true, Some(nt)) if nt > 0 => nt,
        (true, _) => {
            let model = match kind {
                ModelKind::Cosh => "cosh",
                ModelKind::PeriodicExp => "periodic_exp",
                _ => "cosh_const",
            };
            return Err(FitError::MissingPeriod { model });
        }
        (false, _) => 0,
    };
    Ok(match kind {
        ModelKind::Cosh => Box::new(Cosh { period }),
        ModelKind::SingleExp => Box::new(SingleExp),
        ModelKind::PeriodicExp => Box::new(PeriodicExp { period }),
        ModelKind::TwoExp => Box::new(TwoExp),
        ModelKind::CoshConst => Box::new(CoshConst { period }),
    })
}
