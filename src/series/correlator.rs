//! series::correlator — two-point correlator with vacuum expectation values.
//!
//! A [`Correlator`] bundles the raw correlator `C(c, t)` with the two vacuum
//! expectation values (vevs) of the source and sink operators. The analysis
//! quantity is the vacuum-subtracted correlator
//!
//! ```text
//! S(c, t) = C(c, t) − vev1(c, t) · vev2(c, t)
//! ```
//!
//! which is built once at construction and used for averages, jackknife
//! errors, the covariance matrix and the effective mass.
use ndarray::Array1;
use std::collections::BTreeMap;

use super::errors::{SeriesError, SeriesResult};
use super::indexed::{ConfigId, IndexedSeries, Time};
use super::value::SeriesValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Correlator {
    raw: IndexedSeries<f64>,
    vev1: IndexedSeries<f64>,
    vev2: IndexedSeries<f64>,
    subtracted: IndexedSeries<f64>,
}

impl Correlator {
    /// Bundle a raw correlator with its vevs. `vev2` defaults to `vev1`.
    ///
    /// # Errors
    /// [`SeriesError::IncompatibleSeries`] if any vev disagrees with `raw` on
    /// configurations or time slices.
    pub fn new(
        raw: IndexedSeries<f64>, vev1: IndexedSeries<f64>, vev2: Option<IndexedSeries<f64>>,
    ) -> SeriesResult<Self> {
        let vev2 = vev2.unwrap_or_else(|| vev1.clone());
        if !raw.is_compatible(&vev1) {
            return Err(SeriesError::IncompatibleSeries { reason: "vev1 does not match the correlator" });
        }
        if !raw.is_compatible(&vev2) {
            return Err(SeriesError::IncompatibleSeries { reason: "vev2 does not match the correlator" });
        }
        let product = vev1.zip_with(&vev2, |a, b| a * b)?;
        let subtracted = raw.zip_with(&product, |c, v| c - v)?;
        Ok(Self { raw, vev1, vev2, subtracted })
    }

    /// Correlator without vacuum contributions (both vevs zero).
    pub fn without_vev(raw: IndexedSeries<f64>) -> SeriesResult<Self> {
        let zeros = raw.zip_with(&raw, |_, _| 0.0)?;
        Self::new(raw, zeros, None)
    }

    /// Vevs given as one scalar per configuration, broadcast over time.
    ///
    /// # Errors
    /// [`SeriesError::UnknownConfig`] if a configuration of `raw` has no vev
    /// entry, [`SeriesError::IncompatibleSeries`] if a map carries extra
    /// configurations, [`SeriesError::NonFiniteValue`] on null vevs.
    pub fn with_scalar_vevs(
        raw: IndexedSeries<f64>, vev1: &BTreeMap<ConfigId, f64>, vev2: Option<&BTreeMap<ConfigId, f64>>,
    ) -> SeriesResult<Self> {
        let v1 = broadcast(&raw, vev1)?;
        let v2 = vev2.map(|m| broadcast(&raw, m)).transpose()?;
        Self::new(raw, v1, v2)
    }

    pub fn raw(&self) -> &IndexedSeries<f64> {
        &self.raw
    }

    pub fn vev1(&self) -> &IndexedSeries<f64> {
        &self.vev1
    }

    pub fn vev2(&self) -> &IndexedSeries<f64> {
        &self.vev2
    }

    pub fn configs(&self) -> &[ConfigId] {
        self.raw.configs()
    }

    pub fn times(&self) -> &[Time] {
        self.raw.times()
    }

    pub fn num_configs(&self) -> usize {
        self.raw.num_configs()
    }

    /// Per-configuration vacuum-subtracted correlator `S(c, t)`.
    pub fn sub_vev(&self) -> &IndexedSeries<f64> {
        &self.subtracted
    }

    /// Mean of `S` over configurations, aligned with [`Self::times`].
    pub fn average_sub_vev(&self) -> Array1<f64> {
        self.subtracted.average_over_configs()
    }

    /// Jackknife errors of [`Self::average_sub_vev`].
    pub fn jackknifed_errors(&self) -> Array1<f64> {
        self.subtracted.jackknife_errors()
    }

    /// Copy of the correlator whose configuration `k` is the configuration at
    /// dense position `positions[k]` (raw and both vevs).
    pub fn with_rows(&self, positions: &[usize]) -> SeriesResult<Self> {
        Ok(Self {
            raw: self.raw.with_rows(positions)?,
            vev1: self.vev1.with_rows(positions)?,
            vev2: self.vev2.with_rows(positions)?,
            subtracted: self.subtracted.with_rows(positions)?,
        })
    }

    /// Effective mass `ln(C(t)/C(t+dt)) / dt` of the averaged subtracted
    /// correlator, for every `t` whose partner `t + dt` is present.
    ///
    /// Entries are `NaN` where the ratio is not positive.
    pub fn effective_mass(&self, dt: usize) -> SeriesResult<Vec<(Time, f64)>> {
        let pairs = self.separation_pairs(dt)?;
        let avg = self.average_sub_vev();
        Ok(pairs.iter().map(|&(t, i, j)| (t, log_ratio(avg[i], avg[j], dt))).collect())
    }

    /// Jackknife errors of [`Self::effective_mass`], from the effective mass of
    /// each leave-one-out average.
    pub fn effective_mass_errors(&self, dt: usize) -> SeriesResult<Vec<(Time, f64)>> {
        let pairs = self.separation_pairs(dt)?;
        let avg = self.average_sub_vev();
        let jk = self.subtracted.jackknife_averages();
        let jk = jk.values();
        Ok(pairs
            .iter()
            .map(|&(t, i, j)| {
                let central = log_ratio(avg[i], avg[j], dt);
                let samples: Vec<f64> = jk
                    .outer_iter()
                    .map(|row| log_ratio(row[i], row[j], dt))
                    .collect();
                (t, f64::jackknife_spread(central, &samples))
            })
            .collect())
    }

    /// `(t, pos(t), pos(t + dt))` for every time with a partner.
    fn separation_pairs(&self, dt: usize) -> SeriesResult<Vec<(Time, usize, usize)>> {
        if dt == 0 {
            return Err(SeriesError::InvalidSeparation { dt });
        }
        let times = self.times();
        Ok(times
            .iter()
            .enumerate()
            .filter_map(|(i, &t)| self.subtracted.time_position(t + dt).ok().map(|j| (t, i, j)))
            .collect())
    }
}

fn log_ratio(now: f64, later: f64, dt: usize) -> f64 {
    let ratio = now / later;
    if ratio > 0.0 && ratio.is_finite() {
        ratio.ln() / dt as f64
    } else {
        f64::NAN
    }
}

fn broadcast(raw: &IndexedSeries<f64>, per_config: &BTreeMap<ConfigId, f64>) -> SeriesResult<IndexedSeries<f64>> {
    if per_config.len() != raw.num_configs() {
        return Err(SeriesError::IncompatibleSeries {
            reason: "vev configurations differ from the correlator",
        });
    }
    let mut values = raw.values().to_owned();
    for (mut row, config) in values.outer_iter_mut().zip(raw.configs()) {
        let v = per_config.get(config).copied().ok_or(SeriesError::UnknownConfig(*config))?;
        row.fill(v);
    }
    IndexedSeries::from_array(raw.configs().to_vec(), raw.times().to_vec(), values)
}

#[cfg(test)]
mod tests {
    // Scope
    // -----
    // Vacuum subtraction, compatibility checks, resampled copies and the
    // effective mass with its jackknife errors.
    use super::*;
    use approx::assert_relative_eq;

    fn exp_correlator(n_configs: usize, mass: f64) -> IndexedSeries<f64> {
        let rows = (0..n_configs)
            .map(|c| {
                let scale = 1.0 + 0.01 * c as f64;
                (0..8).map(|t| (t, scale * (-mass * t as f64).exp())).collect()
            })
            .collect();
        IndexedSeries::from_rows(rows).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Subtraction must be `raw − vev1·vev2` per configuration and time.
    //
    // Given
    // -----
    // - 2 configurations × 2 times, scalar vevs 2.0 (config 0) and 3.0
    //   (config 1), vev2 defaulting to vev1.
    //
    // Expect
    // ------
    // - S = raw − vev² entry-wise.
    fn subtraction_uses_product_of_vevs() {
        let raw = IndexedSeries::from_rows(vec![vec![(0, 10.0), (1, 20.0)], vec![(0, 30.0), (1, 40.0)]]).unwrap();
        let vevs = BTreeMap::from([(0, 2.0), (1, 3.0)]);

        let cor = Correlator::with_scalar_vevs(raw, &vevs, None).unwrap();

        assert_eq!(cor.sub_vev().value(0, 0).unwrap(), 6.0);
        assert_eq!(cor.sub_vev().value(0, 1).unwrap(), 16.0);
        assert_eq!(cor.sub_vev().value(1, 0).unwrap(), 21.0);
        assert_relative_eq!(cor.average_sub_vev()[1], (16.0 + 31.0) / 2.0, epsilon = 1e-14);
    }

    #[test]
    fn with_rows_copies_raw_and_vevs_together() {
        let raw = IndexedSeries::from_rows(vec![vec![(0, 10.0)], vec![(0, 30.0)]]).unwrap();
        let vevs = BTreeMap::from([(0, 2.0), (1, 3.0)]);
        let cor = Correlator::with_scalar_vevs(raw, &vevs, None).unwrap();

        let picked = cor.with_rows(&[1, 1]).unwrap();

        assert_eq!(picked.configs(), &[0, 1]);
        assert_eq!(picked.vev1().value(0, 0).unwrap(), 3.0);
        assert_eq!(picked.sub_vev().value(1, 0).unwrap(), 21.0);
    }

    #[test]
    fn mismatched_vev_is_a_data_integrity_error() {
        let raw = exp_correlator(3, 0.5);
        let short = exp_correlator(2, 0.5);

        let err = Correlator::new(raw, short, None).unwrap_err();

        assert!(matches!(err, SeriesError::IncompatibleSeries { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A pure exponential has constant effective mass equal to its decay rate.
    //
    // Given
    // -----
    // - C(c, t) = (1 + 0.01c) · exp(−0.4 t), no vev, dt = 2.
    //
    // Expect
    // ------
    // - effective mass 0.4 at every t with a partner (t = 0..5).
    // - jackknife errors ≈ 0 because every configuration has the same shape.
    fn effective_mass_of_single_exponential_is_flat() {
        let cor = Correlator::without_vev(exp_correlator(5, 0.4)).unwrap();

        let emass = cor.effective_mass(2).unwrap();
        let errors = cor.effective_mass_errors(2).unwrap();

        assert_eq!(emass.len(), 6);
        for (_, m) in &emass {
            assert_relative_eq!(*m, 0.4, epsilon = 1e-12);
        }
        for (_, e) in &errors {
            assert!(*e < 1e-12);
        }
    }

    #[test]
    fn effective_mass_is_nan_for_non_positive_ratio() {
        let raw = IndexedSeries::from_rows(vec![vec![(0, 1.0), (1, -1.0)]]).unwrap();
        let cor = Correlator::without_vev(raw).unwrap();

        let emass = cor.effective_mass(1).unwrap();

        assert!(emass[0].1.is_nan());
        assert_eq!(cor.effective_mass(0).unwrap_err(), SeriesError::InvalidSeparation { dt: 0 });
    }
}
