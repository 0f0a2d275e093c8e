//! Encoding of sample lists into piecewise empirical distributions.
//!
//! A sorted sample list is split into `bin_count` contiguous bins spanning `[min, max]`. Each bin records the
//! fraction of samples it holds together with their rounded mean and standard deviation, which is what the
//! synthetic benchmark needs to select a bin by proportion and draw a value within it.

use crate::{mean, stdev, EncodedConfig, Error, ParamMap, Parameter, ParameterSet};
use std::{fmt::Display, str::FromStr, thread};

/// Number of samples per bin targeted by [`BinCount::Auto`].
pub const AUTO_SAMPLES_PER_BIN: usize = 1000;

//=================
// BinCount

/// Requested number of bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinCount {
    /// One bin per [`AUTO_SAMPLES_PER_BIN`] samples, rounded (ties to even), and at least one.
    #[default]
    Auto,
    /// A fixed, positive number of bins.
    Fixed(usize),
}

impl BinCount {
    /// Number of bins to use for a list of `sample_count` samples.
    pub fn resolve(self, sample_count: usize) -> usize {
        match self {
            BinCount::Auto => {
                let bins = (sample_count as f64 / AUTO_SAMPLES_PER_BIN as f64).round_ties_even();
                (bins as usize).max(1)
            }
            BinCount::Fixed(n) => n.max(1),
        }
    }
}

impl FromStr for BinCount {
    type Err = Error;

    /// Parses `"auto"` or a positive integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(BinCount::Auto);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 && s.bytes().all(|b| b.is_ascii_digit()) => Ok(BinCount::Fixed(n)),
            _ => Err(Error::InvalidBinCount(s.to_owned())),
        }
    }
}

impl Display for BinCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinCount::Auto => f.write_str("auto"),
            BinCount::Fixed(n) => write!(f, "{n}"),
        }
    }
}

//=================
// Bin and EncodedDistribution

/// A contiguous sub-range of an empirical distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    /// Lower boundary.
    pub min: i64,
    /// Upper boundary.
    pub max: i64,
    /// Fraction of all samples falling in this bin.
    pub proportion: f64,
    /// Rounded mean of the bin's samples; `0` for an empty bin.
    pub mean: i64,
    /// Rounded sample standard deviation of the bin's samples; `0` for fewer than 2 samples.
    pub stdev: i64,
}

impl Bin {
    /// Builds a bin over `[min, max]` from its (sorted) members.
    fn from_members(min: i64, max: i64, members: &[i64], total: usize) -> Self {
        let (mean, stdev) = match members {
            [] => (0, 0),
            [only] => (*only, 0),
            _ => (mean(members), stdev(members)),
        };
        Self {
            min,
            max,
            proportion: members.len() as f64 / total as f64,
            mean,
            stdev,
        }
    }

    /// Whether the bin holds no samples.
    pub fn is_gap(&self) -> bool {
        self.proportion == 0.0
    }
}

impl Display for Bin {
    /// `BIN_MIN, BIN_MAX, BIN_PROP, BIN_MEAN, BIN_STDEV`, with the proportion written to 20 decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {:.20}, {}, {}",
            self.min, self.max, self.proportion, self.mean, self.stdev
        )
    }
}

/// The piecewise empirical distribution of one parameter.
///
/// The bins are contiguous, non-overlapping and span `[min, max]`; their proportions sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDistribution {
    pub parameter: Parameter,
    pub min: i64,
    pub max: i64,
    pub mean: i64,
    pub stdev: i64,
    pub bins: Vec<Bin>,
}

impl EncodedDistribution {
    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Whether all source samples were identical, in which case there is a single bin with `min == max`.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Sum of all bin proportions.
    pub fn total_proportion(&self) -> f64 {
        self.bins.iter().map(|b| b.proportion).sum()
    }
}

impl Display for EncodedDistribution {
    /// Writes the interchange-file block for this distribution, one line per field, each line terminated
    /// by a newline.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PARAM: {}", self.parameter.config_name())?;
        writeln!(f, "BIN_COUNT: {}", self.bin_count())?;
        writeln!(f, "MIN: {}", self.min)?;
        writeln!(f, "MAX: {}", self.max)?;
        writeln!(f, "MEAN: {}", self.mean)?;
        writeln!(f, "STDEV: {}", self.stdev)?;
        for bin in &self.bins {
            writeln!(f, "{bin}")?;
        }
        Ok(())
    }
}

//=================
// Encoding

/// Generates `bin_count + 1` boundaries from `min` to `max` by repeatedly adding the real-valued bin width to an
/// accumulator and rounding (ties to even) each accumulated value.
///
/// Rounding the accumulator, rather than computing `min + i * width` with a uniform floor or ceiling, can yield
/// slightly unequal bin widths. The benchmark's numeric expectations were established with this behavior.
///
/// The span is computed in `i128`, so any `min <= max` pair is accepted. Boundaries are clamped to
/// `[min, max]` and the last one is always `max`, which only matters when the span exceeds `f64` precision.
pub fn bin_boundaries(min: i64, max: i64, bin_count: usize) -> Vec<i64> {
    let bin_count = bin_count.max(1);
    let width = (i128::from(max) - i128::from(min)) as f64 / bin_count as f64;
    let mut acc = min as f64;
    let mut bounds = Vec::with_capacity(bin_count + 1);
    bounds.push(min);
    for _ in 1..bin_count {
        acc += width;
        bounds.push((acc.round_ties_even() as i64).clamp(min, max));
    }
    bounds.push(max);
    bounds
}

/// Encodes an ascending `sorted` sample list into `bin_count` bins. Returns `None` if `sorted` is empty.
///
/// Each bin `[lo, hi)` takes the samples below `hi` not already taken by earlier bins, in a single forward scan
/// over the list. The last bin also takes every remaining sample, so `max` always lands in it.
pub fn encode_sorted(
    parameter: Parameter,
    sorted: &[i64],
    bin_count: usize,
) -> Option<EncodedDistribution> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    debug_assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "samples must be sorted");

    let bins = if min == max {
        vec![Bin {
            min,
            max,
            proportion: 1.0,
            mean: min,
            stdev: 0,
        }]
    } else {
        let bin_count = bin_count.max(1);
        let bounds = bin_boundaries(min, max, bin_count);
        let total = sorted.len();
        let mut cursor = 0;
        let mut bins = Vec::with_capacity(bin_count);
        for (idx, pair) in bounds.windows(2).enumerate() {
            let (lo, hi) = (pair[0], pair[1]);
            let is_last = idx + 1 == bin_count;
            let start = cursor;
            while cursor < total && (is_last || sorted[cursor] < hi) {
                cursor += 1;
            }
            bins.push(Bin::from_members(lo, hi, &sorted[start..cursor], total));
        }
        bins
    };

    Some(EncodedDistribution {
        parameter,
        min,
        max,
        mean: mean(sorted),
        stdev: stdev(sorted),
        bins,
    })
}

/// Encodes one parameter's samples. Returns `None` for an empty sample list, which is omitted from
/// interchange files rather than encoded.
pub fn encode(
    parameter: Parameter,
    samples: &[i64],
    bin_count: BinCount,
) -> Option<EncodedDistribution> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let bins = bin_count.resolve(sorted.len());
    log::debug!(
        "encoding {parameter}: {} sample(s) into {bins} bin(s)",
        sorted.len()
    );
    encode_sorted(parameter, &sorted, bins)
}

/// Encodes every nonempty parameter of `params`, spreading the parameters over up to `workers` threads.
///
/// Each thread owns its parameters' samples exclusively. All threads are joined before the result is assembled,
/// and the result is keyed by [`Parameter`], so its order is the canonical parameter order regardless of which
/// thread finished first.
pub fn encode_all(params: &ParameterSet, bin_count: BinCount, workers: usize) -> EncodedConfig {
    log::trace!("entering `encode_all` with {workers} worker(s)");
    let nonempty: Vec<(Parameter, &[i64])> = params
        .iter()
        .filter(|(_, samples)| !samples.is_empty())
        .map(|(&p, samples)| (p, samples.as_slice()))
        .collect();
    let workers = workers.clamp(1, nonempty.len().max(1));

    // Round-robin assignment of parameters to workers.
    let mut assignments: Vec<Vec<(Parameter, &[i64])>> = vec![Vec::new(); workers];
    for (idx, item) in nonempty.into_iter().enumerate() {
        assignments[idx % workers].push(item);
    }

    let encoded: Vec<EncodedDistribution> = thread::scope(|scope| {
        let handles: Vec<_> = assignments
            .into_iter()
            .map(|assigned| {
                scope.spawn(move || {
                    assigned
                        .into_iter()
                        .filter_map(|(p, samples)| encode(p, samples, bin_count))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(dists) => dists,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    });

    encoded
        .into_iter()
        .map(|dist| (dist.parameter, dist))
        .collect::<ParamMap<_>>()
}
