//! series — configuration/time indexed data and correlators.
//!
//! - [`indexed`]: the rectangular `IndexedSeries<T>` container with sums,
//!   averages and jackknife statistics.
//! - [`correlator`]: raw correlator + vevs, vacuum subtraction, effective mass.
//! - [`summation`]: Neumaier compensated summation used by every reduction.
//! - [`value`]: the `SeriesValue` trait implemented for `f64` and `Complex64`.
//! - [`errors`]: `SeriesError` / `SeriesResult`.
pub mod correlator;
pub mod errors;
pub mod indexed;
pub mod summation;
pub mod value;

pub use correlator::Correlator;
pub use errors::{IndexAxis, SeriesError, SeriesResult};
pub use indexed::{ConfigId, IndexedSeries, SeriesSlice, Time};
pub use value::SeriesValue;
