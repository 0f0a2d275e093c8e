//! Main public interface: configuration of the ingest → summarize → encode → validate pipeline.

use crate::{
    check_fit, encode_all, ingest_file, ingest_lines, write_config, BinCount, EncodedConfig, FitReport,
    ParamMap, ParameterSet, Result, SummaryStats, TokenizedColumns, DEFAULT_ALPHA,
};
use std::{path::Path, thread};

/// Configuration for profiling communication parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Profiler {
    pub(crate) bin_count: BinCount,
    pub(crate) workers: usize,
    pub(crate) alpha: f64,
    pub(crate) hist_sigfig: u8,
    pub(crate) columns: TokenizedColumns,
}

impl Default for Profiler {
    /// Instantiates a [`Profiler`] with default configuration. The defaults are:
    /// - [`BinCount::Auto`] bins per parameter;
    /// - as many encoding workers as [`thread::available_parallelism`] reports;
    /// - a significance level of [`DEFAULT_ALPHA`];
    /// - summary histograms with a `hist_sigfig` of 3 (see [hdrhistogram::Histogram::sigfig]);
    /// - the default [`TokenizedColumns`].
    fn default() -> Self {
        Self {
            bin_count: BinCount::Auto,
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            alpha: DEFAULT_ALPHA,
            hist_sigfig: 3,
            columns: TokenizedColumns::default(),
        }
    }
}

impl Profiler {
    /// Creates a new [`Profiler`] configured the same as `self` but with the given `bin_count`.
    pub fn with_bin_count(&self, bin_count: BinCount) -> Self {
        Self {
            bin_count,
            ..self.clone()
        }
    }

    /// Creates a new [`Profiler`] configured the same as `self` but with the given number of encoding workers.
    /// `0` is treated as `1`.
    pub fn with_workers(&self, workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..self.clone()
        }
    }

    /// Creates a new [`Profiler`] configured the same as `self` but with the given significance level.
    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            alpha,
            ..self.clone()
        }
    }

    /// Creates a new [`Profiler`] configured the same as `self` but with the given `hist_sigfig`
    /// (see [hdrhistogram::Histogram::sigfig]).
    pub fn with_hist_sigfig(&self, hist_sigfig: u8) -> Self {
        Self {
            hist_sigfig,
            ..self.clone()
        }
    }

    /// Creates a new [`Profiler`] configured the same as `self` but with the given tokenized-dialect columns.
    pub fn with_columns(&self, columns: TokenizedColumns) -> Self {
        Self {
            columns,
            ..self.clone()
        }
    }

    pub fn bin_count(&self) -> BinCount {
        self.bin_count
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Parses log lines with [`ingest_lines`].
    pub fn ingest_lines<I, S>(&self, lines: I) -> ParameterSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ingest_lines(lines, self.columns)
    }

    /// Reads and parses a log file with [`ingest_file`].
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<ParameterSet> {
        ingest_file(path, self.columns)
    }

    /// [`SummaryStats`] for every nonempty parameter.
    pub fn summarize(&self, params: &ParameterSet) -> Result<ParamMap<SummaryStats>> {
        params
            .filter_map_values(|_, samples| {
                (!samples.is_empty()).then(|| SummaryStats::from_samples(samples, self.hist_sigfig))
            })
            .into_iter()
            .map(|(p, summary)| summary.map(|s| (p, s)))
            .collect()
    }

    /// Encodes every nonempty parameter with [`encode_all`].
    pub fn encode(&self, params: &ParameterSet) -> EncodedConfig {
        encode_all(params, self.bin_count, self.workers)
    }

    /// Encodes `params` and writes the interchange file to `path`; returns the file's fingerprint.
    pub fn encode_to_file(&self, params: &ParameterSet, path: impl AsRef<Path>) -> Result<String> {
        let config = self.encode(params);
        write_config(path, &config)
    }

    /// Validates `generated` against `observed` with [`check_fit`] at the configured significance level.
    pub fn check_fit(&self, observed: &ParameterSet, generated: &ParameterSet) -> FitReport {
        check_fit(observed, generated, self.alpha)
    }
}
