#![allow(dead_code)]

use comm_empirical::EncodedDistribution;
use rand::{rngs::StdRng, Rng, SeedableRng};

pub fn f64_are_close(left: f64, right: f64, tolerance: f64) -> bool {
    (left - right).abs() <= tolerance
}

/// Deterministic random sample list of length `len` with values in `[low, high]`.
pub fn random_samples(seed: u64, len: usize, low: i64, high: i64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(low..=high)).collect()
}

/// Asserts the structural invariants every encoded distribution must satisfy.
pub fn assert_well_formed(dist: &EncodedDistribution) {
    let bins = &dist.bins;
    assert!(!bins.is_empty(), "{:?}: at least one bin", dist.parameter);
    assert_eq!(bins[0].min, dist.min, "first bin starts at the global min");
    assert_eq!(bins[bins.len() - 1].max, dist.max, "last bin ends at the global max");
    for pair in bins.windows(2) {
        assert_eq!(pair[0].max, pair[1].min, "bins are contiguous: {pair:?}");
        assert!(pair[0].min <= pair[0].max, "bin bounds are ordered: {pair:?}");
    }
    let total = dist.total_proportion();
    assert!(
        f64_are_close(total, 1.0, 1e-9),
        "{:?}: proportions sum to {total}",
        dist.parameter
    );
    for bin in bins.iter().filter(|b| b.is_gap()) {
        assert_eq!((bin.mean, bin.stdev), (0, 0), "gap bins have zero stats");
    }
}
