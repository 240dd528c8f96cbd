//! fit::tmin — stability of a fitted parameter against the window start.
use log::info;
use rand::Rng;

use super::errors::{FitError, FitResult};
use super::fitter::fit;
use super::models::FitModel;
use super::options::{FitOptions, FitWindow};
use crate::series::{Correlator, Time};

/// One fit of a tmin scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TminPoint {
    pub tmin: Time,
    /// Point estimate of the scanned parameter.
    pub value: f64,
    /// Bootstrap standard error of the scanned parameter.
    pub error: f64,
    pub quality: f64,
}

/// Fit windows `[t, tmax]` for `t = tmin, tmin + 1, …` and track one
/// parameter.
///
/// The scan stops at the last `t` that still leaves one degree of freedom,
/// `tmax − n_params`. All fits draw their replicas from the same `rng`, in
/// order of increasing `t`.
///
/// # Errors
/// - [`FitError::UnknownParameter`] if `parameter` is not a model parameter.
/// - [`FitError::InsufficientDegreesOfFreedom`] if even `[tmin, tmax]` is
///   too short.
/// - Any error of the individual fits, which aborts the scan.
pub fn scan_tmin<M, R>(
    model: &M, cor: &Correlator, tmin: Time, tmax: Time, parameter: &str, opts: &FitOptions, rng: &mut R,
) -> FitResult<Vec<TminPoint>>
where
    M: FitModel + ?Sized,
    R: Rng + ?Sized,
{
    let index = model
        .parameter_names()
        .iter()
        .position(|n| *n == parameter)
        .ok_or_else(|| FitError::UnknownParameter { name: parameter.to_string() })?;
    let n_params = model.n_params();
    FitWindow::new(tmin, tmax)?.degrees_of_freedom(n_params)?;
    let last = tmax - n_params;

    let mut points = Vec::with_capacity(last - tmin + 1);
    for t in tmin..=last {
        let outcome = fit(model, cor, FitWindow::new(t, tmax)?, opts, rng)?;
        let point = TminPoint {
            tmin: t,
            value: outcome.point_estimate.values()[index],
            error: outcome.bootstrap_variance.values()[index].sqrt(),
            quality: outcome.quality,
        };
        info!("tmin {t}: {parameter} = {:.6} ± {:.6} (Q {:.4})", point.value, point.error, point.quality);
        points.push(point);
    }
    Ok(points)
}
