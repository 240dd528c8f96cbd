//! covariance::errors — failures while estimating or inverting covariance matrices.
use crate::series::SeriesError;

/// Result alias for covariance estimation and inversion.
pub type CovResult<T> = Result<T, CovError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CovError {
    /// The covariance of the mean needs at least two configurations.
    TooFewConfigs { found: usize },

    /// `tmin >= tmax`: the half-open window holds no time slice.
    EmptyWindow { tmin: usize, tmax: usize },

    /// A window time slice is absent from the correlator.
    TimeOutOfRange { time: usize },

    NotSquare { rows: usize, cols: usize },

    /// Neither inverse candidate reproduces the identity within `tolerance`.
    /// `None` marks a candidate that could not be computed at all.
    Inversion { direct_error: Option<f64>, cholesky_error: Option<f64>, tolerance: f64 },

    Series(SeriesError),
}

impl std::error::Error for CovError {}

impl std::fmt::Display for CovError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CovError::TooFewConfigs { found } => {
                write!(f, "Covariance needs at least 2 configurations, found {found}")
            }
            CovError::EmptyWindow { tmin, tmax } => {
                write!(f, "Empty covariance window [{tmin}, {tmax})")
            }
            CovError::TimeOutOfRange { time } => {
                write!(f, "Time slice {time} of the window is not in the correlator")
            }
            CovError::NotSquare { rows, cols } => {
                write!(f, "Cannot invert a non-square {rows}x{cols} matrix")
            }
            CovError::Inversion { direct_error, cholesky_error, tolerance } => write!(
                f,
                "Inversion error: no inverse within tolerance {tolerance:e} (direct: {}, cholesky: {})",
                fmt_metric(*direct_error),
                fmt_metric(*cholesky_error)
            ),
            CovError::Series(e) => write!(f, "{e}"),
        }
    }
}

fn fmt_metric(metric: Option<f64>) -> String {
    match metric {
        Some(v) => format!("{v:e}"),
        None => "failed".to_string(),
    }
}

impl From<SeriesError> for CovError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::UnknownTime(time) => CovError::TimeOutOfRange { time },
            other => CovError::Series(other),
        }
    }
}
