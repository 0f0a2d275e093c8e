//! Summary statistics over integer sample lists.
//!
//! [`mean`] and [`stdev`] produce the rounded integers written to interchange files. Rounding is to the
//! nearest integer with ties to even. Both degrade to `0` when the statistic is undefined, so encoding
//! never fails on sparse data.
//!
//! [`SummaryStats`] is a richer, diagnostic-only summary that includes percentiles.

use crate::Result;
use hdrhistogram::Histogram;
use std::{cmp::Ordering, fmt::Display};

/// Arithmetic mean rounded to the nearest integer (ties to even); `0` for an empty list.
pub fn mean(samples: &[i64]) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: i128 = samples.iter().map(|&v| v as i128).sum();
    round_div_ties_even(sum, samples.len() as i128) as i64
}

/// Sample standard deviation (`N - 1` denominator) rounded to the nearest integer (ties to even);
/// `0` when there are fewer than 2 samples.
pub fn stdev(samples: &[i64]) -> i64 {
    exact_stdev(samples).round_ties_even() as i64
}

/// Unrounded arithmetic mean; `0.0` for an empty list.
pub fn exact_mean(samples: &[i64]) -> f64 {
    welford(samples).0
}

/// Unrounded sample standard deviation; `0.0` when there are fewer than 2 samples.
pub fn exact_stdev(samples: &[i64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let (_, m2) = welford(samples);
    (m2 / (samples.len() - 1) as f64).sqrt()
}

/// Welford's online algorithm; returns the mean and the sum of squared deviations.
fn welford(samples: &[i64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &v) in samples.iter().enumerate() {
        let x = v as f64;
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    (mean, m2)
}

/// `num / den` rounded to the nearest integer, ties to even. `den` must be positive.
fn round_div_ties_even(num: i128, den: i128) -> i128 {
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    match (2 * r).cmp(&den) {
        Ordering::Less => q,
        Ordering::Greater => q + 1,
        Ordering::Equal if q.rem_euclid(2) == 0 => q,
        Ordering::Equal => q + 1,
    }
}

/// Common summary statistics for a parameter's samples.
///
/// `mean`, `stdev`, `min` and `max` are exact; percentiles come from an [`hdrhistogram::Histogram`] and are
/// accurate to the configured number of significant figures. All fields are zero for an empty sample list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub count: u64,
    pub mean: f64,
    pub stdev: f64,
    pub min: i64,
    pub p1: i64,
    pub p5: i64,
    pub p10: i64,
    pub p25: i64,
    pub median: i64,
    pub p75: i64,
    pub p90: i64,
    pub p95: i64,
    pub p99: i64,
    pub max: i64,
}

impl SummaryStats {
    /// Computes summary statistics from `samples`, using a histogram with `hist_sigfig` significant figures
    /// (see [hdrhistogram::Histogram::sigfig]).
    ///
    /// Samples are recorded relative to the minimum, so negative values (e.g. backward strides) are supported.
    pub fn from_samples(samples: &[i64], hist_sigfig: u8) -> Result<Self> {
        let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
            return Ok(Self::default());
        };

        let mut hist = Histogram::<u64>::new(hist_sigfig)?;
        for &v in samples {
            hist.record(v.abs_diff(min))?;
        }
        let q = |quantile: f64| -> i64 {
            let offset = hist.value_at_quantile(quantile);
            min.saturating_add_unsigned(offset).clamp(min, max)
        };

        Ok(Self {
            count: samples.len() as u64,
            mean: exact_mean(samples),
            stdev: exact_stdev(samples),
            min,
            p1: q(0.01),
            p5: q(0.05),
            p10: q(0.10),
            p25: q(0.25),
            median: q(0.50),
            p75: q(0.75),
            p90: q(0.90),
            p95: q(0.95),
            p99: q(0.99),
            max,
        })
    }
}

impl Display for SummaryStats {
    /// One tab-indented `label: value` line per field; the mean and standard deviation use two decimals.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\tCount: {}", self.count)?;
        writeln!(f, "\tMean: {:.2}", self.mean)?;
        writeln!(f, "\tStdev: {:.2}", self.stdev)?;
        writeln!(f, "\tMin: {}", self.min)?;
        let percentiles = [
            ("P1", self.p1),
            ("P5", self.p5),
            ("P10", self.p10),
            ("P25", self.p25),
            ("Median", self.median),
            ("P75", self.p75),
            ("P90", self.p90),
            ("P95", self.p95),
            ("P99", self.p99),
        ];
        for (label, value) in percentiles {
            writeln!(f, "\t{label}: {value}")?;
        }
        writeln!(f, "\tMax: {}", self.max)
    }
}

#[cfg(test)]
mod test {
    use super::round_div_ties_even;

    #[test]
    fn test_round_div_ties_even() {
        assert_eq!(round_div_ties_even(5, 2), 2);
        assert_eq!(round_div_ties_even(7, 2), 4);
        assert_eq!(round_div_ties_even(-5, 2), -2);
        assert_eq!(round_div_ties_even(-7, 2), -4);
        assert_eq!(round_div_ties_even(10, 3), 3);
        assert_eq!(round_div_ties_even(11, 3), 4);
        assert_eq!(round_div_ties_even(-11, 3), -4);
    }
}
