//! resampling — bootstrap replicas of correlators.
pub mod bootstrap;

pub use bootstrap::{draw_indices, ensemble, resample, resample_with, DEFAULT_BOOTSTRAPS};
