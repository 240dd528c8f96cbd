//! series::errors — data-integrity and lookup errors for indexed series.
//!
//! Purpose
//! -------
//! Define [`SeriesError`], the error surface for constructing and querying
//! configuration/time indexed data. Construction failures (ragged rows,
//! missing time slices, null entries, incompatible companion series) form the
//! *data-integrity* family and are fatal: the parsing layer must fix its input
//! rather than retry. Lookup failures mirror a missing-key error on a mapping.
//!
//! Conventions
//! -----------
//! - Configuration ids and time indices are reported with their original
//!   values, not their dense storage positions.
//! - A *null* entry is any non-finite value (NaN / ±∞).
//! - [`SeriesResult<T>`] is the result alias used by every fallible routine
//!   in `series`.

/// Result alias for series construction and lookups.
pub type SeriesResult<T> = Result<T, SeriesError>;

/// Which index axis an ordering problem was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAxis {
    Configs,
    Times,
}

impl std::fmt::Display for IndexAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexAxis::Configs => write!(f, "configuration"),
            IndexAxis::Times => write!(f, "time"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    // ---- Data integrity ----
    /// No configurations, or a configuration without any time slice.
    EmptySeries,

    /// A configuration holds a different number of time slices than the first one.
    RaggedConfig { config: usize, expected: usize, found: usize },

    /// A configuration lacks a time slice present in the first configuration.
    MissingTime { config: usize, time: usize },

    /// A configuration lists the same time slice twice.
    DuplicateTime { config: usize, time: usize },

    /// A value is null (NaN or ±∞).
    NonFiniteValue { config: usize, time: usize },

    /// Dense storage does not match the declared index lengths.
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Index labels must be strictly increasing.
    UnorderedIndex { axis: IndexAxis },

    /// Companion series (e.g. vevs) do not share configs and times.
    IncompatibleSeries { reason: &'static str },

    // ---- Lookups ----
    /// Configuration id is not part of the series.
    UnknownConfig(usize),

    /// Time index is not part of the series.
    UnknownTime(usize),

    /// Dense configuration position is out of range (resampling).
    ConfigPositionOutOfRange { position: usize, len: usize },

    /// Effective-mass separation must be at least one time slice.
    InvalidSeparation { dt: usize },
}

impl std::error::Error for SeriesError {}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Data integrity ----
            SeriesError::EmptySeries => {
                write!(f, "Data integrity error: series holds no configurations or time slices")
            }
            SeriesError::RaggedConfig { config, expected, found } => write!(
                f,
                "Data integrity error: configuration {config} has {found} time slices, expected {expected}"
            ),
            SeriesError::MissingTime { config, time } => {
                write!(f, "Data integrity error: configuration {config} lacks time slice {time}")
            }
            SeriesError::DuplicateTime { config, time } => {
                write!(f, "Data integrity error: configuration {config} repeats time slice {time}")
            }
            SeriesError::NonFiniteValue { config, time } => write!(
                f,
                "Data integrity error: value at configuration {config}, time {time} is null or non-finite"
            ),
            SeriesError::ShapeMismatch { expected, found } => write!(
                f,
                "Data integrity error: storage shape {found:?} does not match index shape {expected:?}"
            ),
            SeriesError::UnorderedIndex { axis } => {
                write!(f, "Data integrity error: {axis} labels must be strictly increasing")
            }
            SeriesError::IncompatibleSeries { reason } => {
                write!(f, "Data integrity error: incompatible series: {reason}")
            }

            // ---- Lookups ----
            SeriesError::UnknownConfig(config) => write!(f, "Unknown configuration {config}"),
            SeriesError::UnknownTime(time) => write!(f, "Unknown time slice {time}"),
            SeriesError::ConfigPositionOutOfRange { position, len } => write!(
                f,
                "Configuration position {position} out of range for {len} configurations"
            ),
            SeriesError::InvalidSeparation { dt } => {
                write!(f, "Invalid effective-mass separation {dt}: must be at least 1")
            }
        }
    }
}
