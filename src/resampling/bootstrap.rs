//! resampling::bootstrap — configuration resampling with replacement.
//!
//! Purpose
//! -------
//! Build bootstrap replicas of a [`Correlator`]: each replica has as many
//! configurations as the original, drawn uniformly with replacement, and
//! relabeled `0..N`. Raw correlator and both vevs are copied together so
//! vacuum subtraction stays consistent inside a replica.
//!
//! Key behaviors
//! -------------
//! - Randomness comes only from the caller's `Rng`; seeding it makes every
//!   replica reproducible.
//! - [`draw_indices`] and [`resample_with`] split drawing from building so a
//!   caller can draw all replicas sequentially and build / fit them in
//!   parallel without changing the result.
use rand::Rng;

use crate::series::{Correlator, SeriesResult};

/// Number of replicas used when the caller does not choose one.
pub const DEFAULT_BOOTSTRAPS: usize = 100;

/// `n` configuration positions drawn uniformly from `0..n` with replacement.
pub fn draw_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Replica whose configuration `k` copies the original configuration at
/// dense position `positions[k]`.
pub fn resample_with(cor: &Correlator, positions: &[usize]) -> SeriesResult<Correlator> {
    cor.with_rows(positions)
}

/// One bootstrap replica.
pub fn resample<R: Rng + ?Sized>(cor: &Correlator, rng: &mut R) -> SeriesResult<Correlator> {
    let positions = draw_indices(cor.num_configs(), rng);
    resample_with(cor, &positions)
}

/// `count` independent replicas, drawn in order from `rng`.
pub fn ensemble<R: Rng + ?Sized>(cor: &Correlator, count: usize, rng: &mut R) -> SeriesResult<Vec<Correlator>> {
    (0..count).map(|_| resample(cor, rng)).collect()
}

#[cfg(test)]
mod tests {
    // Scope
    // -----
    // Size preservation, membership, relabeling and determinism of replicas.
    use super::*;
    use crate::series::IndexedSeries;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn labeled_correlator() -> Correlator {
        // Config c holds value 100 + c at every time; vev is c.
        let mut data = BTreeMap::new();
        let mut vev = BTreeMap::new();
        for c in [3usize, 7, 11, 19, 23] {
            data.insert(c, (0..4).map(|t| (t, 100.0 + c as f64)).collect::<BTreeMap<_, _>>());
            vev.insert(c, c as f64);
        }
        let raw = IndexedSeries::new(data).unwrap();
        Correlator::with_scalar_vevs(raw, &vev, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A replica keeps the configuration count and only contains original
    // configurations, with raw and vev copied together.
    //
    // Given
    // -----
    // - 5 configurations with distinct ids, value 100 + id and vev = id.
    //
    // Expect
    // ------
    // - configs relabeled 0..5.
    // - every replica row matches some original (raw, vev) pair.
    fn replica_preserves_size_and_membership() {
        // Arrange
        let cor = labeled_correlator();
        let mut rng = StdRng::seed_from_u64(7);

        // Act
        let replica = resample(&cor, &mut rng).unwrap();

        // Assert
        assert_eq!(replica.configs(), &[0, 1, 2, 3, 4]);
        for k in replica.configs() {
            let raw = replica.raw().value(*k, 0).unwrap();
            let vev = replica.vev1().value(*k, 0).unwrap();
            let original = (raw - 100.0).round() as usize;
            assert!(cor.configs().contains(&original));
            assert_eq!(vev, original as f64);
        }
    }

    #[test]
    // Purpose
    // -------
    // Replicas depend only on the seed.
    //
    // Given
    // -----
    // - Two RNGs seeded identically, ensembles of 10 replicas.
    //
    // Expect
    // ------
    // - identical ensembles; a different seed changes at least one replica.
    fn ensemble_is_reproducible_from_seed() {
        let cor = labeled_correlator();

        let a = ensemble(&cor, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = ensemble(&cor, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = ensemble(&cor, 10, &mut StdRng::seed_from_u64(43)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn drawn_indices_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);

        let idx = draw_indices(50, &mut rng);

        assert_eq!(idx.len(), 50);
        assert!(idx.iter().all(|&i| i < 50));
    }
}
