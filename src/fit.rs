//! Goodness-of-fit validation of generated samples against observed samples.
//!
//! Each parameter is compared with a two-sample Kolmogorov-Smirnov test. The statistic is the largest vertical
//! distance between the two empirical CDFs. The p-value is computed exactly for small samples and from the
//! asymptotic Kolmogorov distribution otherwise.

use crate::{ParamMap, Parameter, ParameterSet};
use std::fmt::Display;

/// Default significance level: a fit is good iff its p-value is at least this.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Largest `n1 * n2` for which the p-value is computed exactly.
pub const EXACT_KS_MAX_CELLS: u64 = 1_000_000;

//=================
// Kolmogorov-Smirnov test

/// How a [`KsTest`] p-value was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsMethod {
    /// Exact probability over all interleavings of the two samples.
    Exact,
    /// Asymptotic Kolmogorov distribution with a small-sample correction.
    Asymptotic,
}

/// Outcome of a two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Largest absolute difference between the two empirical CDFs, in `[0, 1]`.
    pub statistic: f64,
    /// Probability, under the hypothesis that both samples come from the same distribution, of a statistic at
    /// least as large as the one observed.
    pub p_value: f64,
    pub method: KsMethod,
}

/// Runs a two-sided two-sample Kolmogorov-Smirnov test. Returns `None` if either sample is empty.
pub fn ks_2samp(a: &[i64], b: &[i64]) -> Option<KsTest> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    let (n1, n2) = (a.len() as u64, b.len() as u64);

    let d_scaled = scaled_statistic(&a, &b);
    let statistic = d_scaled as f64 / (n1 * n2) as f64;

    let (p_value, method) = if n1 * n2 <= EXACT_KS_MAX_CELLS {
        (exact_p_value(n1, n2, d_scaled), KsMethod::Exact)
    } else {
        (asymptotic_p_value(n1, n2, statistic), KsMethod::Asymptotic)
    };

    Some(KsTest {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        method,
    })
}

/// Returns the KS statistic multiplied by `n1 * n2`, i.e. `max |i * n2 - j * n1|` over the points where the
/// merged walk through both sorted samples has consumed `i` values of `a` and `j` values of `b`. Tied values are
/// consumed together, so the statistic is evaluated only between distinct values.
fn scaled_statistic(a: &[i64], b: &[i64]) -> u64 {
    let (n1, n2) = (a.len() as u64, b.len() as u64);
    let (mut i, mut j) = (0, 0);
    let mut d = 0;
    while i < a.len() && j < b.len() {
        let v = a[i].min(b[j]);
        while i < a.len() && a[i] == v {
            i += 1;
        }
        while j < b.len() && b[j] == v {
            j += 1;
        }
        d = d.max((i as u64 * n2).abs_diff(j as u64 * n1));
    }
    d
}

/// Exact `P(D >= d)` where `d = d_scaled / (n1 * n2)`.
///
/// All `C(n1 + n2, n1)` lattice paths from `(0, 0)` to `(n1, n2)` are equally likely under the null hypothesis.
/// The recurrence tracks the probability of reaching each point while staying strictly inside the band
/// `|i * n2 - j * n1| < d_scaled`; the complement of reaching `(n1, n2)` that way is the p-value.
fn exact_p_value(n1: u64, n2: u64, d_scaled: u64) -> f64 {
    if d_scaled == 0 {
        return 1.0;
    }
    let inside = |i: u64, j: u64| (i * n2).abs_diff(j * n1) < d_scaled;
    let cols = n2 as usize + 1;

    // prob[j] holds the probability for row `i` (values of `a` consumed) and column `j`.
    let mut prob = vec![0.0_f64; cols];
    for i in 0..=n1 {
        for j in 0..=n2 {
            let jj = j as usize;
            if !inside(i, j) {
                prob[jj] = 0.0;
                continue;
            }
            if i == 0 && j == 0 {
                prob[jj] = 1.0;
                continue;
            }
            // From (i - 1, j): `a` had n1 - i + 1 values left out of n1 - i + 1 + n2 - j remaining.
            let from_above = if i > 0 {
                let left_a = (n1 - i + 1) as f64;
                prob[jj] * left_a / (left_a + (n2 - j) as f64)
            } else {
                0.0
            };
            // From (i, j - 1): `b` had n2 - j + 1 values left out of n1 - i + n2 - j + 1 remaining.
            let from_left = if j > 0 {
                let left_b = (n2 - j + 1) as f64;
                prob[jj - 1] * left_b / ((n1 - i) as f64 + left_b)
            } else {
                0.0
            };
            prob[jj] = from_above + from_left;
        }
    }
    1.0 - prob[cols - 1]
}

/// Asymptotic `P(D >= d)` from the Kolmogorov distribution, with the effective sample size
/// `n1 * n2 / (n1 + n2)` and Stephens' correction.
fn asymptotic_p_value(n1: u64, n2: u64, statistic: f64) -> f64 {
    let en = (n1 * n2) as f64 / (n1 + n2) as f64;
    let sqrt_en = en.sqrt();
    kolmogorov_q((sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic)
}

/// Complementary CDF of the Kolmogorov distribution,
/// `Q(lambda) = 2 * sum_{k >= 1} (-1)^(k - 1) * exp(-2 * k^2 * lambda^2)`.
/// Returns 1 where the alternating series does not converge (small `lambda`).
fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut prev_term = 0.0_f64;
    for k in 1..=100 {
        let kf = k as f64;
        let term = fac * (a2 * kf * kf).exp();
        sum += term;
        if term.abs() <= 0.001 * prev_term || term.abs() <= 1.0e-8 * sum {
            return sum;
        }
        fac = -fac;
        prev_term = term.abs();
    }
    1.0
}

//=================
// Fit report

/// Count and range of one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideStats {
    pub count: usize,
    pub min: i64,
    pub max: i64,
}

impl SideStats {
    /// Returns `None` for an empty sample list.
    pub fn new(samples: &[i64]) -> Option<Self> {
        Some(Self {
            count: samples.len(),
            min: *samples.iter().min()?,
            max: *samples.iter().max()?,
        })
    }
}

/// Which side of a comparison had no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ObservedEmpty,
    GeneratedEmpty,
    BothEmpty,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::ObservedEmpty => "observed data is empty",
            SkipReason::GeneratedEmpty => "generated data is empty",
            SkipReason::BothEmpty => "observed and generated data are empty",
        };
        f.write_str(s)
    }
}

/// Result of validating one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Compared {
        test: KsTest,
        /// `test.p_value >= alpha`.
        good_fit: bool,
        observed: SideStats,
        generated: SideStats,
    },
    Skipped(SkipReason),
}

impl FitOutcome {
    /// Compares `observed` and `generated` at significance level `alpha`.
    pub fn evaluate(observed: &[i64], generated: &[i64], alpha: f64) -> Self {
        match (SideStats::new(observed), SideStats::new(generated)) {
            (None, None) => FitOutcome::Skipped(SkipReason::BothEmpty),
            (None, Some(_)) => FitOutcome::Skipped(SkipReason::ObservedEmpty),
            (Some(_), None) => FitOutcome::Skipped(SkipReason::GeneratedEmpty),
            (Some(obs), Some(generated_stats)) => match ks_2samp(observed, generated) {
                Some(test) => FitOutcome::Compared {
                    test,
                    good_fit: test.p_value >= alpha,
                    observed: obs,
                    generated: generated_stats,
                },
                None => FitOutcome::Skipped(SkipReason::BothEmpty),
            },
        }
    }

    /// `Some(true)` for a good fit, `Some(false)` for a bad fit, `None` if skipped.
    pub fn is_good_fit(&self) -> Option<bool> {
        match self {
            FitOutcome::Compared { good_fit, .. } => Some(*good_fit),
            FitOutcome::Skipped(_) => None,
        }
    }
}

/// Per-parameter fit outcomes, in canonical parameter order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub alpha: f64,
    pub outcomes: ParamMap<FitOutcome>,
}

impl FitReport {
    /// Parameters that were compared and found to fit badly.
    pub fn bad_fits(&self) -> Vec<Parameter> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_good_fit() == Some(false))
            .map(|(&p, _)| p)
            .collect()
    }
}

/// Validates every parameter of `generated` against `observed`. A parameter with an empty side is skipped
/// without affecting the others.
pub fn check_fit(observed: &ParameterSet, generated: &ParameterSet, alpha: f64) -> FitReport {
    log::trace!("entering `check_fit` with alpha={alpha}");
    let outcomes = ParamMap::from_fn(|p| {
        let outcome = FitOutcome::evaluate(observed.samples(p), generated.samples(p), alpha);
        if let FitOutcome::Skipped(reason) = &outcome {
            log::debug!("skipped {p}: {reason}");
        }
        outcome
    });
    FitReport { alpha, outcomes }
}

impl Display for FitReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (param, outcome) in &self.outcomes {
            match outcome {
                FitOutcome::Compared {
                    test,
                    good_fit,
                    observed,
                    generated,
                } => {
                    writeln!(f, "Checking {param} Fit")?;
                    writeln!(f, "\tTest: two-sample Kolmogorov-Smirnov ({:?})", test.method)?;
                    writeln!(f, "\tKolmogorov-Smirnov Statistic: {}", test.statistic)?;
                    writeln!(f, "\tP-Value: {}", test.p_value)?;
                    if *good_fit {
                        writeln!(f, "\tThis is a good fit! (alpha = {})", self.alpha)?;
                    } else {
                        writeln!(f, "\tThis is a bad fit! (alpha = {})", self.alpha)?;
                    }
                    writeln!(f, "\tObserved Data Count: {}", observed.count)?;
                    writeln!(f, "\tObserved Data Min: {}", observed.min)?;
                    writeln!(f, "\tObserved Data Max: {}", observed.max)?;
                    writeln!(f, "\tGenerated Data Count: {}", generated.count)?;
                    writeln!(f, "\tGenerated Data Min: {}", generated.min)?;
                    writeln!(f, "\tGenerated Data Max: {}", generated.max)?;
                }
                FitOutcome::Skipped(reason) => {
                    writeln!(f, "Skipped {param} because parameter is empty ({reason}).")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
