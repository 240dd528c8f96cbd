//! series::value — the scalar types an [`IndexedSeries`](super::IndexedSeries) can hold.
//!
//! A series is either real (`f64`) or complex (`Complex64`); the two never mix
//! inside one instance. [`SeriesValue`] captures the arithmetic the container
//! needs (compensated sums, scaling by counts, jackknife spread) so the
//! container itself is written once.
//!
//! Complex jackknife errors are reported component-wise: the real part holds
//! the error of the real parts, the imaginary part the error of the imaginary
//! parts.

use num_complex::Complex64;
use std::ops::{Add, Div, Mul, Sub};

use super::summation::{neumaier_sum, NeumaierSum};

pub trait SeriesValue:
    Copy
    + std::fmt::Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    fn zero() -> Self;

    /// `false` for NaN or ±∞ in any component.
    fn is_finite_value(&self) -> bool;

    /// Order-stable compensated sum.
    fn compensated_sum<I: IntoIterator<Item = Self>>(values: I) -> Self;

    /// `sqrt((N−1)/N · Σ (sample − mean)²)`, component-wise for complex values.
    fn jackknife_spread(mean: Self, samples: &[Self]) -> Self;
}

impl SeriesValue for f64 {
    fn zero() -> Self {
        0.0
    }

    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }

    fn compensated_sum<I: IntoIterator<Item = Self>>(values: I) -> Self {
        neumaier_sum(values)
    }

    fn jackknife_spread(mean: Self, samples: &[Self]) -> Self {
        real_spread(samples.iter().map(|&s| s - mean), samples.len())
    }
}

impl SeriesValue for Complex64 {
    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    fn is_finite_value(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    fn compensated_sum<I: IntoIterator<Item = Self>>(values: I) -> Self {
        let mut re = NeumaierSum::new();
        let mut im = NeumaierSum::new();
        for v in values {
            re.add(v.re);
            im.add(v.im);
        }
        Complex64::new(re.total(), im.total())
    }

    fn jackknife_spread(mean: Self, samples: &[Self]) -> Self {
        let n = samples.len();
        Complex64::new(
            real_spread(samples.iter().map(|s| s.re - mean.re), n),
            real_spread(samples.iter().map(|s| s.im - mean.im), n),
        )
    }
}

fn real_spread<I: Iterator<Item = f64>>(deviations: I, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let ss = neumaier_sum(deviations.map(|d| d * d));
    ((n - 1.0) / n * ss).sqrt()
}
