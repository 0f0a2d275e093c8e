//! This library extracts communication-pattern parameters (message sizes, partner counts, access strides,
//! update frequencies) from the execution logs of a distributed simulation and compresses them into piecewise
//! empirical distributions that a synthetic benchmark consumes to reproduce the same communication behavior.
//!
//! The pipeline is:
//! - [`ingest_lines`] / [`ingest_file`] parse a log (tagged or pipe-delimited dialect) into a [`ParameterSet`];
//! - [`mean`] / [`stdev`] and [`SummaryStats`] summarize each parameter's samples;
//! - [`encode`] / [`encode_all`] bin the samples into [`EncodedDistribution`]s, serialized by
//!   [`write_config`] in the benchmark's interchange format;
//! - [`check_fit`] compares an observed and a generated [`ParameterSet`] with a two-sample
//!   Kolmogorov-Smirnov test.
//!
//! [`Profiler`] bundles the configuration of all of the above.
//!
//! ```rust
//! use comm_empirical::{BinCount, Parameter, Profiler};
//!
//! let lines = [
//!     "PARAM: nowned - 10",
//!     "PARAM: nowned - 20",
//!     "PARAM: indices_needed - 10 15 17",
//! ];
//! let profiler = Profiler::default().with_bin_count(BinCount::Fixed(2));
//! let params = profiler.ingest_lines(lines);
//! assert_eq!(params.samples(Parameter::Stride), &[5, 2]);
//!
//! let config = profiler.encode(&params);
//! assert_eq!(config.get(&Parameter::NOwned).map(|d| d.bins.len()), Some(2));
//! ```
#![deny(clippy::unwrap_used)]

mod error;
pub use error::*;

mod param_map;
pub use param_map::*;

mod parameter;
pub use parameter::*;

mod ingest;
pub use ingest::*;

mod stats;
pub use stats::*;

mod encoder;
pub use encoder::*;

mod interchange;
pub use interchange::*;

mod fit;
pub use fit::*;

mod sampler;
pub use sampler::*;

mod profiler;
pub use profiler::*;
