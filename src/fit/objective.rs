//! fit::objective — the two cost functions of a fit chain.
//!
//! - [`ModelResiduals`]: unweighted residuals `f(t; θ) − C̄(t)` for the
//!   Levenberg–Marquardt seed.
//! - [`CorrelatedChiSquare`]: `χ²(θ) = rᵀ C⁻¹ r` for the Nelder–Mead
//!   refinement.
use ndarray::{Array1, Array2, Axis};

use super::errors::FitResult;
use super::models::FitModel;
use super::options::FitWindow;
use crate::covariance::estimator::window_positions;
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::ResidualModel,
    simplex::Objective,
    types::{Cost, Residuals, Theta},
    validation::validate_theta0,
};
use crate::series::Correlator;

/// Times and averaged vacuum-subtracted values inside a fit window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowData {
    pub times: Array1<f64>,
    pub observed: Array1<f64>,
}

impl WindowData {
    /// # Errors
    /// Fails when a time of the window is missing from `cor`.
    pub fn from_correlator(cor: &Correlator, window: FitWindow) -> FitResult<Self> {
        let positions = window_positions(cor.sub_vev(), window.tmin, window.end())?;
        let observed = cor.average_sub_vev().select(Axis(0), &positions);
        let times = window.times().map(|t| t as f64).collect();
        Ok(Self { times, observed })
    }
}

/// Window data with the inverse covariance weighting its residuals.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedData<'a> {
    pub window: &'a WindowData,
    pub inv_cov: &'a Array2<f64>,
}

fn model_residuals<M: FitModel + ?Sized>(model: &M, theta: &Theta, data: &WindowData) -> Residuals {
    Array1::from_iter(
        data.times.iter().zip(data.observed.iter()).map(|(&t, &obs)| model.formula(theta, t) - obs),
    )
}

fn check_params<M: FitModel + ?Sized>(model: &M, theta: &Theta) -> OptResult<()> {
    validate_theta0(theta, model.n_params())
}

/// Unweighted residuals of `model` against the window data.
pub struct ModelResiduals<'m, M: ?Sized> {
    pub model: &'m M,
}

impl<M: FitModel + ?Sized> ResidualModel for ModelResiduals<'_, M> {
    type Data = WindowData;

    fn residuals(&self, theta: &Theta, data: &WindowData) -> OptResult<Residuals> {
        Ok(model_residuals(self.model, theta, data))
    }

    fn check(&self, theta: &Theta, _data: &WindowData) -> OptResult<()> {
        check_params(self.model, theta)
    }
}

/// Correlated chi-square of `model`; the data borrows for as long as the
/// model reference.
pub struct CorrelatedChiSquare<'m, M: ?Sized> {
    pub model: &'m M,
}

impl<'m, M: FitModel + ?Sized> Objective for CorrelatedChiSquare<'m, M> {
    type Data = CorrelatedData<'m>;

    fn value(&self, theta: &Theta, data: &CorrelatedData<'m>) -> OptResult<Cost> {
        Ok(chi_square(self.model, theta, data))
    }

    fn check(&self, theta: &Theta, data: &CorrelatedData<'m>) -> OptResult<()> {
        check_params(self.model, theta)?;
        let n = data.window.times.len();
        if data.inv_cov.dim() != (n, n) {
            return Err(OptError::ResidualDimMismatch { expected: n, found: data.inv_cov.nrows() });
        }
        Ok(())
    }
}

/// `rᵀ C⁻¹ r` with `r = f(t; θ) − C̄(t)` over the window.
pub fn chi_square<M: FitModel + ?Sized>(model: &M, theta: &Theta, data: &CorrelatedData<'_>) -> f64 {
    let r = model_residuals(model, theta, data.window);
    r.dot(&data.inv_cov.dot(&r))
}
