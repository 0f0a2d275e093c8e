//! Drawing synthetic values from encoded distributions, the way the synthetic benchmark does.
//!
//! A draw selects a bin with probability equal to its proportion, then draws a normally distributed value with the
//! bin's mean and standard deviation. The value is rounded and clamped into the bin's range.

use crate::{EncodedConfig, EncodedDistribution, Parameter};
use rand::Rng;
use std::f64::consts::PI;

/// Sampler over one [`EncodedDistribution`].
#[derive(Debug, Clone)]
pub struct EmpiricalSampler<'a> {
    dist: &'a EncodedDistribution,
    cumulative: Vec<f64>,
}

impl<'a> EmpiricalSampler<'a> {
    pub fn new(dist: &'a EncodedDistribution) -> Self {
        let cumulative = dist
            .bins
            .iter()
            .scan(0.0, |acc, bin| {
                *acc += bin.proportion;
                Some(*acc)
            })
            .collect();
        Self { dist, cumulative }
    }

    pub fn parameter(&self) -> Parameter {
        self.dist.parameter
    }

    /// Draws one value.
    ///
    /// Degenerate distributions always yield their single value. Otherwise the first bin whose cumulative
    /// proportion exceeds a uniform draw in `[0, 1)` is chosen; if rounding leaves the total proportion short
    /// of the draw, the last bin is chosen.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        if self.dist.is_degenerate() || self.dist.bins.is_empty() {
            return self.dist.min;
        }
        let u: f64 = rng.gen();
        let idx = self
            .cumulative
            .iter()
            .position(|&c| u < c)
            .unwrap_or(self.dist.bins.len() - 1);
        let bin = &self.dist.bins[idx];
        let value = gauss(bin.mean as f64, bin.stdev as f64, rng).round() as i64;
        value.clamp(bin.min, bin.max)
    }
}

/// Normally distributed value via the Box-Muller transform.
pub fn gauss<R: Rng + ?Sized>(mean: f64, stdev: f64, rng: &mut R) -> f64 {
    if stdev <= 0.0 {
        return mean;
    }
    // `gen` yields [0, 1); shift u1 into (0, 1] so that ln(u1) is finite.
    let u1 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    r * theta.cos() * stdev + mean
}

/// Draws `iterations` rounds of values for every parameter in `config` and renders them as tagged-dialect log
/// lines, so that a generated run can be ingested and compared with the observed run.
///
/// Each round emits one `PARAM: <key> - <value>` line per single-valued parameter, in canonical order.
/// [`Parameter::UpdatesPerSetup`] is emitted as a `setup called` line followed by that many `update called` lines.
/// Negative strides cannot be written as a `stride` value and are emitted as a two-index `indices_needed` line
/// with the same difference.
pub fn generate_lines<R: Rng + ?Sized>(
    config: &EncodedConfig,
    iterations: usize,
    rng: &mut R,
) -> Vec<String> {
    log::trace!("entering `generate_lines` for {iterations} iteration(s)");
    let samplers: Vec<EmpiricalSampler> = config.values().map(EmpiricalSampler::new).collect();
    let mut lines = Vec::new();
    for _ in 0..iterations {
        for sampler in &samplers {
            let value = sampler.draw(rng);
            match (sampler.parameter(), sampler.parameter().tag_key()) {
                (Parameter::Stride, _) if value < 0 => {
                    lines.push(format!("PARAM: indices_needed - 0 {value}"));
                }
                (_, Some(key)) => lines.push(format!("PARAM: {key} - {value}")),
                (_, None) => {
                    lines.push("setup called".to_owned());
                    for _ in 0..value.max(0) {
                        lines.push("update called".to_owned());
                    }
                }
            }
        }
    }
    lines
}
