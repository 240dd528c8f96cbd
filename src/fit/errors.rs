//! fit::errors — failures of the correlated bootstrap fit.
//!
//! [`FitError::Convergence`] is the fit-convergence error: an optimizer
//! failed in one of the [`FitStage`]s, and the whole fit is aborted. The
//! remaining variants report invalid requests (window, guess, options) or
//! wrap lower-level data and covariance errors.
use crate::covariance::CovError;
use crate::optimization::errors::OptError;
use crate::series::SeriesError;

/// Result alias for fitting routines.
pub type FitResult<T> = Result<T, FitError>;

/// Stages of a single fit chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStage {
    /// Levenberg–Marquardt on unweighted residuals.
    UncorrelatedSeed,
    /// Nelder–Mead on the covariance-weighted chi-square.
    CorrelatedRefine,
    /// Bootstrap mean / variance and quality score.
    Aggregate,
    Done,
}

impl std::fmt::Display for FitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitStage::UncorrelatedSeed => write!(f, "uncorrelated seed"),
            FitStage::CorrelatedRefine => write!(f, "correlated refine"),
            FitStage::Aggregate => write!(f, "aggregate"),
            FitStage::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Convergence ----
    /// An optimizer did not converge; the fit is aborted.
    Convergence { stage: FitStage, source: OptError },

    // ---- Request ----
    /// `tmin > tmax`.
    InvalidWindow { tmin: usize, tmax: usize },

    /// The window must hold more points than the model has parameters.
    InsufficientDegreesOfFreedom { window_len: usize, n_params: usize },

    /// Starting guess length disagrees with the parameter names.
    InvalidGuess { expected: usize, found: usize },

    /// At least one bootstrap replica is required.
    InvalidBootstraps { count: usize },

    /// Periodic models need the temporal extent `Nt`.
    MissingPeriod { model: &'static str },

    UnknownModel { name: String, reason: &'static str },

    UnknownParameter { name: String },

    // ---- Quality ----
    InvalidDegreesOfFreedom { dof: usize },

    /// Chi-square must be a non-negative number.
    InvalidChiSquare { value: f64 },

    /// The incomplete gamma evaluation failed.
    Quality { text: String },

    // ---- Wrapped ----
    Series(SeriesError),
    Covariance(CovError),
    /// Invalid optimizer configuration.
    Options(OptError),
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Convergence ----
            FitError::Convergence { stage, source } => {
                write!(f, "Fit convergence error during {stage}: {source}")
            }

            // ---- Request ----
            FitError::InvalidWindow { tmin, tmax } => {
                write!(f, "Invalid fit window: tmin {tmin} is after tmax {tmax}")
            }
            FitError::InsufficientDegreesOfFreedom { window_len, n_params } => write!(
                f,
                "Fit window of {window_len} points leaves no degrees of freedom for {n_params} parameters"
            ),
            FitError::InvalidGuess { expected, found } => {
                write!(f, "Starting guess has {found} values, model has {expected} parameters")
            }
            FitError::InvalidBootstraps { count } => {
                write!(f, "Invalid bootstrap count {count}: must be at least 1")
            }
            FitError::MissingPeriod { model } => {
                write!(f, "Model '{model}' requires the time period Nt")
            }
            FitError::UnknownModel { name, reason } => {
                write!(f, "Unknown model '{name}': {reason}")
            }
            FitError::UnknownParameter { name } => write!(f, "Unknown parameter '{name}'"),

            // ---- Quality ----
            FitError::InvalidDegreesOfFreedom { dof } => {
                write!(f, "Invalid degrees of freedom {dof}: must be at least 1")
            }
            FitError::InvalidChiSquare { value } => {
                write!(f, "Invalid chi-square {value}: must be finite and non-negative")
            }
            FitError::Quality { text } => write!(f, "Quality of fit evaluation failed: {text}"),

            // ---- Wrapped ----
            FitError::Series(e) => write!(f, "{e}"),
            FitError::Covariance(e) => write!(f, "{e}"),
            FitError::Options(e) => write!(f, "Invalid optimizer options: {e}"),
        }
    }
}

impl From<SeriesError> for FitError {
    fn from(err: SeriesError) -> Self {
        FitError::Series(err)
    }
}

impl From<CovError> for FitError {
    fn from(err: CovError) -> Self {
        FitError::Covariance(err)
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Options(err)
    }
}

impl FitError {
    /// Wrap an optimizer failure as a convergence error of `stage`.
    pub fn convergence(stage: FitStage) -> impl Fn(OptError) -> FitError {
        move |source| FitError::Convergence { stage, source }
    }

    pub fn is_convergence(&self) -> bool {
        matches!(self, FitError::Convergence { .. })
    }
}
