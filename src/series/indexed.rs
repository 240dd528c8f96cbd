//! series::indexed — configuration × time container with jackknife statistics.
//!
//! Purpose
//! -------
//! Hold one measured quantity for every (configuration, time slice) pair and
//! provide the reductions every downstream analysis needs: sums and averages
//! over either axis, the leave-one-out (jackknife) averages and the jackknife
//! error estimate.
//!
//! Key behaviors
//! -------------
//! - [`IndexedSeries::new`] validates the mapping form `config → time → value`
//!   and stores it densely: rows are configurations in ascending id order,
//!   columns are time slices in ascending order.
//! - Per-time sums over configurations and the overall average are computed
//!   lazily once and cached; results do not depend on call order.
//! - Vector-valued results (`Array1`) are aligned with [`IndexedSeries::times`]
//!   or [`IndexedSeries::configs`] as documented per method.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rectangular: every configuration carries exactly the same time slices.
//! - No nulls: every stored value is finite.
//! - Immutable after construction; derived series are new instances.
//!
//! Conventions
//! -----------
//! - Jackknife average for configuration `c` at time `t` is
//!   `(Σ_c' x[c', t] − x[c, t]) / (N − 1)`. For `N = 1` the division is skipped
//!   and the raw leave-one-out sum (zero) is returned.
//! - Jackknife error is `sqrt((N−1)/N · Σ_c (jk[c, t] − mean[t])²)` where
//!   `mean` is the direct average over configurations.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction failures, the sum property, jackknife
//!   consistency, the `N = 1` fallback and complex data.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::errors::{IndexAxis, SeriesError, SeriesResult};
use super::value::SeriesValue;

/// Configuration identifier (Monte Carlo sample label).
pub type ConfigId = usize;
/// Euclidean time slice index.
pub type Time = usize;

/// Result of [`IndexedSeries::get`]: the whole table, one axis slice, or a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSlice<T> {
    Table(BTreeMap<ConfigId, BTreeMap<Time, T>>),
    /// All time slices of one configuration.
    Config(BTreeMap<Time, T>),
    /// One time slice across all configurations.
    Time(BTreeMap<ConfigId, T>),
    Value(T),
}

#[derive(Debug, Clone)]
pub struct IndexedSeries<T: SeriesValue> {
    configs: Vec<ConfigId>,
    times: Vec<Time>,
    config_pos: BTreeMap<ConfigId, usize>,
    time_pos: BTreeMap<Time, usize>,
    values: Array2<T>,
    sums: OnceLock<Array1<T>>,
    total: OnceLock<T>,
}

impl<T: SeriesValue> IndexedSeries<T> {
    /// Build a series from its mapping form `config → time → value`.
    ///
    /// The first configuration (lowest id) defines the time set; every other
    /// configuration must carry exactly those time slices.
    ///
    /// # Errors
    /// - [`SeriesError::EmptySeries`] when there are no configurations or the
    ///   first configuration has no time slices.
    /// - [`SeriesError::RaggedConfig`] / [`SeriesError::MissingTime`] when a
    ///   configuration disagrees with the time set.
    /// - [`SeriesError::NonFiniteValue`] for null entries.
    pub fn new(data: BTreeMap<ConfigId, BTreeMap<Time, T>>) -> SeriesResult<Self> {
        let first = data.values().next().ok_or(SeriesError::EmptySeries)?;
        if first.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        let times: Vec<Time> = first.keys().copied().collect();
        let configs: Vec<ConfigId> = data.keys().copied().collect();

        let mut flat = Vec::with_capacity(configs.len() * times.len());
        for (&config, row) in &data {
            if row.len() != times.len() {
                return Err(SeriesError::RaggedConfig {
                    config,
                    expected: times.len(),
                    found: row.len(),
                });
            }
            for &time in &times {
                let value = row.get(&time).ok_or(SeriesError::MissingTime { config, time })?;
                if !value.is_finite_value() {
                    return Err(SeriesError::NonFiniteValue { config, time });
                }
                flat.push(*value);
            }
        }

        let values = Array2::from_shape_vec((configs.len(), times.len()), flat).map_err(|_| {
            SeriesError::ShapeMismatch {
                expected: (configs.len(), times.len()),
                found: (data.len(), first.len()),
            }
        })?;
        Ok(Self::from_parts(configs, times, values))
    }

    /// Build a series from per-configuration rows of `(time, value)` pairs.
    ///
    /// Row `i` becomes configuration `i`. Convenient for parsers that read
    /// one configuration per line.
    pub fn from_rows(rows: Vec<Vec<(Time, T)>>) -> SeriesResult<Self> {
        let mut data = BTreeMap::new();
        for (config, row) in rows.into_iter().enumerate() {
            let mut slices = BTreeMap::new();
            for (time, value) in row {
                if slices.insert(time, value).is_some() {
                    return Err(SeriesError::DuplicateTime { config, time });
                }
            }
            data.insert(config, slices);
        }
        Self::new(data)
    }

    /// Build a series from dense storage and explicit labels.
    ///
    /// # Errors
    /// - [`SeriesError::ShapeMismatch`] if `values` is not
    ///   `configs.len() × times.len()`.
    /// - [`SeriesError::UnorderedIndex`] unless both label vectors are
    ///   strictly increasing.
    /// - [`SeriesError::EmptySeries`] / [`SeriesError::NonFiniteValue`].
    pub fn from_array(
        configs: Vec<ConfigId>, times: Vec<Time>, values: Array2<T>,
    ) -> SeriesResult<Self> {
        if configs.is_empty() || times.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        if values.dim() != (configs.len(), times.len()) {
            return Err(SeriesError::ShapeMismatch {
                expected: (configs.len(), times.len()),
                found: values.dim(),
            });
        }
        if configs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeriesError::UnorderedIndex { axis: IndexAxis::Configs });
        }
        if times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeriesError::UnorderedIndex { axis: IndexAxis::Times });
        }
        if let Some(((i, j), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite_value()) {
            return Err(SeriesError::NonFiniteValue { config: configs[i], time: times[j] });
        }
        Ok(Self::from_parts(configs, times, values))
    }

    /// Labels already validated; only builds the lookup maps.
    pub(crate) fn from_parts(configs: Vec<ConfigId>, times: Vec<Time>, values: Array2<T>) -> Self {
        let config_pos = configs.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let time_pos = times.iter().enumerate().map(|(j, &t)| (t, j)).collect();
        Self {
            configs,
            times,
            config_pos,
            time_pos,
            values,
            sums: OnceLock::new(),
            total: OnceLock::new(),
        }
    }

    // ---- Index access ----

    pub fn configs(&self) -> &[ConfigId] {
        &self.configs
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// `(configs, times)`.
    pub fn indexes(&self) -> (&[ConfigId], &[Time]) {
        (&self.configs, &self.times)
    }

    pub fn num_configs(&self) -> usize {
        self.configs.len()
    }

    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    /// Dense view: rows follow [`Self::configs`], columns follow [`Self::times`].
    pub fn values(&self) -> ArrayView2<'_, T> {
        self.values.view()
    }

    pub fn config_position(&self, config: ConfigId) -> SeriesResult<usize> {
        self.config_pos.get(&config).copied().ok_or(SeriesError::UnknownConfig(config))
    }

    pub fn time_position(&self, time: Time) -> SeriesResult<usize> {
        self.time_pos.get(&time).copied().ok_or(SeriesError::UnknownTime(time))
    }

    /// Same configuration ids and time slices, regardless of value type.
    pub fn is_compatible<U: SeriesValue>(&self, other: &IndexedSeries<U>) -> bool {
        self.configs == other.configs && self.times == other.times
    }

    // ---- Lookups ----

    pub fn value(&self, config: ConfigId, time: Time) -> SeriesResult<T> {
        let i = self.config_position(config)?;
        let j = self.time_position(time)?;
        Ok(self.values[[i, j]])
    }

    /// Time-ordered values of one configuration.
    pub fn config_row(&self, config: ConfigId) -> SeriesResult<ArrayView1<'_, T>> {
        let i = self.config_position(config)?;
        Ok(self.values.row(i))
    }

    /// Config-ordered values of one time slice.
    pub fn time_column(&self, time: Time) -> SeriesResult<ArrayView1<'_, T>> {
        let j = self.time_position(time)?;
        Ok(self.values.column(j))
    }

    /// Mapping-style access with optional keys on both axes.
    ///
    /// `(None, None)` returns the full table, one key returns the slice along
    /// the other axis, both keys return the scalar.
    pub fn get(&self, config: Option<ConfigId>, time: Option<Time>) -> SeriesResult<SeriesSlice<T>> {
        match (config, time) {
            (None, None) => Ok(SeriesSlice::Table(self.to_map())),
            (Some(c), None) => {
                let row = self.config_row(c)?;
                Ok(SeriesSlice::Config(self.times.iter().copied().zip(row.iter().copied()).collect()))
            }
            (None, Some(t)) => {
                let col = self.time_column(t)?;
                Ok(SeriesSlice::Time(self.configs.iter().copied().zip(col.iter().copied()).collect()))
            }
            (Some(c), Some(t)) => self.value(c, t).map(SeriesSlice::Value),
        }
    }

    /// Mapping form `config → time → value`, the inverse of [`Self::new`].
    pub fn to_map(&self) -> BTreeMap<ConfigId, BTreeMap<Time, T>> {
        self.configs
            .iter()
            .zip(self.values.outer_iter())
            .map(|(&c, row)| (c, self.times.iter().copied().zip(row.iter().copied()).collect()))
            .collect()
    }

    // ---- Reductions ----

    /// Per-time compensated sum over configurations, aligned with [`Self::times`].
    pub fn sum_over_configs(&self) -> &Array1<T> {
        self.sums.get_or_init(|| {
            self.values
                .axis_iter(Axis(1))
                .map(|col| T::compensated_sum(col.iter().copied()))
                .collect()
        })
    }

    /// Per-time mean over configurations, aligned with [`Self::times`].
    pub fn average_over_configs(&self) -> Array1<T> {
        let n = self.num_configs() as f64;
        self.sum_over_configs().mapv(|s| s / n)
    }

    /// Per-configuration mean over time slices, aligned with [`Self::configs`].
    pub fn average_over_times(&self) -> Array1<T> {
        let n = self.num_times() as f64;
        self.values.outer_iter().map(|row| T::compensated_sum(row.iter().copied()) / n).collect()
    }

    /// Mean over every (config, time) entry.
    pub fn average_all(&self) -> T {
        *self.total.get_or_init(|| {
            let n = (self.num_configs() * self.num_times()) as f64;
            T::compensated_sum(self.sum_over_configs().iter().copied()) / n
        })
    }

    // ---- Jackknife ----

    /// Leave-one-configuration-out averages as a new series with the same labels.
    pub fn jackknife_averages(&self) -> IndexedSeries<T> {
        let n = self.num_configs();
        let sums = self.sum_over_configs();
        let mut jk = Array2::from_elem(self.values.dim(), T::zero());
        for ((i, j), x) in self.values.indexed_iter() {
            let loo = sums[j] - *x;
            jk[[i, j]] = if n > 1 { loo / (n - 1) as f64 } else { loo };
        }
        IndexedSeries::from_parts(self.configs.clone(), self.times.clone(), jk)
    }

    /// Jackknife error per time slice, aligned with [`Self::times`].
    pub fn jackknife_errors(&self) -> Array1<T> {
        let jk = self.jackknife_averages();
        let mean = self.average_over_configs();
        jk.values
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(col, &m)| {
                let samples: Vec<T> = col.iter().copied().collect();
                T::jackknife_spread(m, &samples)
            })
            .collect()
    }

    /// Leave-one-configuration-out estimates of [`Self::average_all`],
    /// aligned with [`Self::configs`].
    ///
    /// With `total = average_all()` and `single` the configuration's own
    /// average over time, each entry is `(N·total − single)/(N − 1)`.
    pub fn jackknife_full_average(&self) -> Array1<T> {
        let n = self.num_configs();
        let total = self.average_all();
        self.average_over_times().mapv(|single| {
            let loo = total * n as f64 - single;
            if n > 1 {
                loo / (n - 1) as f64
            } else {
                loo
            }
        })
    }

    // ---- Derived series ----

    /// New series whose configuration `k` is a copy of the configuration at
    /// dense position `positions[k]`. Labels become `0..positions.len()`.
    pub fn with_rows(&self, positions: &[usize]) -> SeriesResult<IndexedSeries<T>> {
        if positions.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        let len = self.num_configs();
        if let Some(&position) = positions.iter().find(|&&p| p >= len) {
            return Err(SeriesError::ConfigPositionOutOfRange { position, len });
        }
        let values = self.values.select(Axis(0), positions);
        Ok(IndexedSeries::from_parts((0..positions.len()).collect(), self.times.clone(), values))
    }

    /// Element-wise combination with a compatible series.
    pub fn zip_with<F>(&self, other: &IndexedSeries<T>, f: F) -> SeriesResult<IndexedSeries<T>>
    where
        F: Fn(T, T) -> T,
    {
        if !self.is_compatible(other) {
            return Err(SeriesError::IncompatibleSeries {
                reason: "configurations or time slices differ",
            });
        }
        let mut values = self.values.clone();
        values.zip_mut_with(&other.values, |a, &b| *a = f(*a, b));
        IndexedSeries::from_array(self.configs.clone(), self.times.clone(), values)
    }
}

impl<T: SeriesValue> PartialEq for IndexedSeries<T> {
    fn eq(&self, other: &Self) -> bool {
        self.configs == other.configs && self.times == other.times && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    // Scope
    // -----
    // IndexedSeries construction, lookups, reductions and jackknife.
    //
    // Not covered here: vacuum subtraction and effective mass (see
    // `series::correlator`).
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn table(rows: &[&[f64]]) -> IndexedSeries<f64> {
        let rows = rows
            .iter()
            .map(|r| r.iter().copied().enumerate().collect::<Vec<(Time, f64)>>())
            .collect();
        IndexedSeries::from_rows(rows).expect("valid table")
    }

    #[test]
    // Purpose
    // -------
    // Sum over configurations must equal the elementwise sum of the raw table.
    //
    // Given
    // -----
    // - 3 configurations × 4 times with mixed-sign values.
    //
    // Expect
    // ------
    // - `sum_over_configs()[t]` equals the column sum for every t.
    fn sum_over_configs_matches_column_sums() {
        let s = table(&[&[1.0, -2.0, 3.0, 0.5], &[4.0, 5.0, -6.0, 0.25], &[7.0, 8.0, 9.0, 0.125]]);

        let sums = s.sum_over_configs();

        let expected = [12.0, 11.0, 6.0, 0.875];
        for (got, want) in sums.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-14);
        }
    }

    #[test]
    // Purpose
    // -------
    // Jackknife samples average back to the direct mean and errors are ≥ 0.
    //
    // Given
    // -----
    // - 5 configurations × 3 times.
    //
    // Expect
    // ------
    // - mean over configs of `jackknife_averages()` equals
    //   `average_over_configs()` per time.
    // - every jackknife error is non-negative and finite.
    fn jackknife_mean_matches_direct_average() {
        let s = table(&[
            &[1.0, 2.0, 3.0],
            &[1.5, 2.5, 2.0],
            &[0.5, 1.0, 4.0],
            &[2.0, 3.0, 3.5],
            &[1.2, 2.2, 2.8],
        ]);

        let jk_mean = s.jackknife_averages().average_over_configs();
        let direct = s.average_over_configs();
        let errors = s.jackknife_errors();

        for (a, b) in jk_mean.iter().zip(direct.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14);
        }
        assert!(errors.iter().all(|e| e.is_finite() && *e >= 0.0));
    }

    #[test]
    // Purpose
    // -------
    // For independent samples the jackknife error of the mean equals the
    // standard error `std/√N` (with the N−1 sample variance).
    //
    // Given
    // -----
    // - One time slice with values [1, 2, 3, 4].
    //
    // Expect
    // ------
    // - error = sqrt(var_{N−1} / N) = sqrt((5/3)/4).
    fn jackknife_error_equals_standard_error_of_mean() {
        let s = table(&[&[1.0], &[2.0], &[3.0], &[4.0]]);

        let err = s.jackknife_errors()[0];

        assert_relative_eq!(err, (5.0f64 / 3.0 / 4.0).sqrt(), epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // A single configuration must not divide by zero.
    //
    // Given
    // -----
    // - N = 1 with finite values.
    //
    // Expect
    // ------
    // - jackknife averages are the un-normalized leave-one-out sums (0.0).
    // - jackknife errors are 0.0 and full-average jackknife is finite.
    fn single_config_jackknife_falls_back_to_unnormalized() {
        let s = table(&[&[3.0, 4.0]]);

        let jk = s.jackknife_averages();
        let errors = s.jackknife_errors();
        let full = s.jackknife_full_average();

        assert_eq!(jk.value(0, 0).unwrap(), 0.0);
        assert_eq!(jk.value(0, 1).unwrap(), 0.0);
        assert!(errors.iter().all(|e| *e == 0.0));
        assert!(full.iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Full-average jackknife matches the leave-one-out average computed by hand.
    //
    // Given
    // -----
    // - 3 configurations × 2 times.
    //
    // Expect
    // ------
    // - entry c equals the mean of all entries outside configuration c.
    fn jackknife_full_average_drops_one_configuration() {
        let s = table(&[&[1.0, 3.0], &[2.0, 6.0], &[4.0, 8.0]]);

        let full = s.jackknife_full_average();

        assert_relative_eq!(full[0], (2.0 + 6.0 + 4.0 + 8.0) / 4.0, epsilon = 1e-14);
        assert_relative_eq!(full[1], (1.0 + 3.0 + 4.0 + 8.0) / 4.0, epsilon = 1e-14);
        assert_relative_eq!(full[2], (1.0 + 3.0 + 2.0 + 6.0) / 4.0, epsilon = 1e-14);
        assert_relative_eq!(s.average_all(), 4.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects malformed tables with data-integrity errors.
    //
    // Given
    // -----
    // - Empty input, a ragged row, a row with a different time set, a NaN.
    //
    // Expect
    // ------
    // - EmptySeries, RaggedConfig, MissingTime, NonFiniteValue respectively.
    fn construction_rejects_malformed_input() {
        let empty: BTreeMap<ConfigId, BTreeMap<Time, f64>> = BTreeMap::new();
        assert_eq!(IndexedSeries::new(empty).unwrap_err(), SeriesError::EmptySeries);

        let ragged = IndexedSeries::from_rows(vec![vec![(0, 1.0), (1, 2.0)], vec![(0, 1.0)]]);
        assert_eq!(
            ragged.unwrap_err(),
            SeriesError::RaggedConfig { config: 1, expected: 2, found: 1 }
        );

        let shifted = IndexedSeries::from_rows(vec![vec![(0, 1.0), (1, 2.0)], vec![(0, 1.0), (2, 2.0)]]);
        assert_eq!(shifted.unwrap_err(), SeriesError::MissingTime { config: 1, time: 1 });

        let null = IndexedSeries::from_rows(vec![vec![(0, 1.0), (1, f64::NAN)]]);
        assert_eq!(null.unwrap_err(), SeriesError::NonFiniteValue { config: 0, time: 1 });
    }

    #[test]
    // Purpose
    // -------
    // `get` mirrors mapping access and reports missing keys.
    //
    // Given
    // -----
    // - Configurations {10, 20} × times {0, 1}.
    //
    // Expect
    // ------
    // - scalar, row and column slices carry the stored values.
    // - absent configuration / time yield lookup errors.
    fn get_returns_slices_and_reports_missing_keys() {
        let mut data = BTreeMap::new();
        data.insert(10, BTreeMap::from([(0, 1.0), (1, 2.0)]));
        data.insert(20, BTreeMap::from([(0, 3.0), (1, 4.0)]));
        let s = IndexedSeries::new(data.clone()).unwrap();

        assert_eq!(s.get(Some(20), Some(1)).unwrap(), SeriesSlice::Value(4.0));
        assert_eq!(
            s.get(Some(10), None).unwrap(),
            SeriesSlice::Config(BTreeMap::from([(0, 1.0), (1, 2.0)]))
        );
        assert_eq!(
            s.get(None, Some(0)).unwrap(),
            SeriesSlice::Time(BTreeMap::from([(10, 1.0), (20, 3.0)]))
        );
        assert_eq!(s.get(None, None).unwrap(), SeriesSlice::Table(data));
        assert_eq!(s.get(Some(11), None).unwrap_err(), SeriesError::UnknownConfig(11));
        assert_eq!(s.get(None, Some(5)).unwrap_err(), SeriesError::UnknownTime(5));
    }

    #[test]
    // Purpose
    // -------
    // Cached reductions do not depend on call order.
    //
    // Given
    // -----
    // - Two identical series; one queried for `average_all` first, the
    //   other for `sum_over_configs` first.
    //
    // Expect
    // ------
    // - identical sums and averages.
    fn cached_reductions_are_order_independent() {
        let a = table(&[&[0.1, 0.2], &[0.3, 0.4], &[0.5, 0.6]]);
        let b = a.clone();

        let avg_a = a.average_all();
        let sums_a = a.sum_over_configs().clone();
        let sums_b = b.sum_over_configs().clone();
        let avg_b = b.average_all();

        assert_eq!(avg_a, avg_b);
        assert_eq!(sums_a, sums_b);
    }

    #[test]
    fn with_rows_relabels_and_rejects_out_of_range() {
        let s = table(&[&[1.0], &[2.0], &[3.0]]);

        let picked = s.with_rows(&[2, 2, 0]).unwrap();

        assert_eq!(picked.configs(), &[0, 1, 2]);
        assert_eq!(picked.time_column(0).unwrap().to_vec(), vec![3.0, 3.0, 1.0]);
        assert_eq!(
            s.with_rows(&[3]).unwrap_err(),
            SeriesError::ConfigPositionOutOfRange { position: 3, len: 3 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Complex series use component-wise jackknife errors.
    //
    // Given
    // -----
    // - 3 configurations, one time, imaginary part constant.
    //
    // Expect
    // ------
    // - imaginary error 0, real error equal to the real-only series error.
    fn complex_series_jackknife_is_component_wise() {
        let rows = vec![
            vec![(0, Complex64::new(1.0, 5.0))],
            vec![(0, Complex64::new(2.0, 5.0))],
            vec![(0, Complex64::new(4.0, 5.0))],
        ];
        let s = IndexedSeries::from_rows(rows).unwrap();
        let real = table(&[&[1.0], &[2.0], &[4.0]]);

        let err = s.jackknife_errors()[0];

        assert_relative_eq!(err.re, real.jackknife_errors()[0], epsilon = 1e-14);
        assert_eq!(err.im, 0.0);
    }
}
