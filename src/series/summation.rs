//! series::summation — compensated (Neumaier) summation.
//!
//! Reductions over the configuration axis can involve thousands of terms of
//! similar magnitude and alternating sign (vacuum-subtracted correlators at
//! large time separation). Every sum in this crate goes through
//! [`NeumaierSum`], which carries a running compensation term so the error
//! bound stays O(ε) instead of O(nε), and which is order-stable: the same
//! input sequence always yields the same bits.

/// Kahan–Babuška–Neumaier accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one term, capturing the low-order bits lost by `sum + value`.
    #[inline]
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl Extend<f64> for NeumaierSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Compensated sum of an iterator of `f64`.
pub fn neumaier_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut acc = NeumaierSum::new();
    acc.extend(values);
    acc.total()
}
