//! The interchange file consumed by the synthetic benchmark.
//!
//! The file starts with [`FILE_HEADER`], which documents the layout, followed by one block per nonempty parameter
//! in canonical parameter order:
//!
//! ```text
//! PARAM: nowned
//! BIN_COUNT: 2
//! MIN: 10
//! MAX: 20
//! MEAN: 15
//! STDEV: 7
//! 10, 15, 0.50000000000000000000, 10, 0
//! 15, 20, 0.50000000000000000000, 20, 0
//! ```
//!
//! Blocks are separated by a blank line. The benchmark locates a block by its exact `PARAM:` line, reads the five
//! header lines and then `BIN_COUNT` bin lines; field order and precision are part of that contract.

use crate::{Bin, EncodedDistribution, Error, ParamMap, Parameter, Result};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};
use std::{fmt::Display, fs, path::Path};

/// Leading lines of every interchange file.
pub const FILE_HEADER: &str = "\
BENCHMARK INPUT FILE
FORMAT IS ORDERED AS FOLLOWS:

PARAM: PARAM_NAME
BIN_COUNT: BIN_COUNT_VALUE
MIN: MIN_VALUE
MAX: MAX_VALUE
MEAN: MEAN_VALUE
STDEV: STDEV_VALUE
BIN_MIN, BIN_MAX, BIN_PROP, BIN_MEAN, BIN_STDEV

";

/// Encoded distributions of all nonempty parameters of one log, in canonical parameter order.
pub type EncodedConfig = ParamMap<EncodedDistribution>;

/// Display adapter that renders an [`EncodedConfig`] as interchange-file text.
pub struct Interchange<'a>(pub &'a EncodedConfig);

impl Display for Interchange<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(FILE_HEADER)?;
        for dist in self.0.values() {
            writeln!(f, "{dist}")?;
        }
        Ok(())
    }
}

/// Renders `config` as interchange-file text.
pub fn to_interchange_string(config: &EncodedConfig) -> String {
    Interchange(config).to_string()
}

/// Short stable identifier of interchange-file text: the base64 encoding of the first 8 bytes of its SHA-256
/// digest. Identical configs always have identical fingerprints.
pub fn fingerprint(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    Base64::encode_string(&hash[0..8])
}

/// Writes `config` to `path` and returns the fingerprint of the written text.
pub fn write_config(path: impl AsRef<Path>, config: &EncodedConfig) -> Result<String> {
    let path = path.as_ref();
    log::trace!("entering `write_config` for {}", path.display());
    let text = to_interchange_string(config);
    fs::write(path, &text).map_err(|source| Error::Write {
        path: path.to_owned(),
        source,
    })?;
    let fp = fingerprint(&text);
    log::info!(
        "wrote {} parameter block(s) to {} (fingerprint {fp})",
        config.len(),
        path.display()
    );
    Ok(fp)
}

/// Reads an interchange file written by [`write_config`].
pub fn read_config(path: impl AsRef<Path>) -> Result<EncodedConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_config(&text)
}

//=================
// Parsing

/// Line cursor that tracks 1-based line numbers for error reporting.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    line_no: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
            line_no: 0,
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next().map(|(idx, line)| {
            self.line_no = idx + 1;
            line
        })
    }

    fn expect_next(&mut self, what: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| Error::Interchange {
            line: self.line_no + 1,
            reason: format!("unexpected end of file, expected {what}"),
        })
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::Interchange {
            line: self.line_no,
            reason: reason.into(),
        }
    }
}

/// Parses interchange-file text. Lines outside parameter blocks (the file header, blank separators) are skipped.
pub fn parse_config(text: &str) -> Result<EncodedConfig> {
    let mut lines = Lines::new(text);
    let mut dists = Vec::new();
    while let Some(line) = lines.next() {
        let Some(name) = line.trim_end().strip_prefix("PARAM: ") else {
            continue;
        };
        // The file header's placeholder line is not a block.
        let Ok(parameter) = name.parse::<Parameter>() else {
            continue;
        };
        dists.push(parse_block(parameter, &mut lines)?);
    }
    Ok(dists.into_iter().map(|d| (d.parameter, d)).collect())
}

fn parse_block(parameter: Parameter, lines: &mut Lines) -> Result<EncodedDistribution> {
    let mut bin_count = None;
    let mut min = None;
    let mut max = None;
    let mut mean = None;
    let mut stdev = None;

    for _ in 0..5 {
        let line = lines.expect_next("a header line")?;
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| lines.error(format!("expected `KEY: value`, found '{line}'")))?;
        let value = value.trim();
        let int = || -> Result<i64> {
            value
                .parse::<i64>()
                .map_err(|_| lines.error(format!("invalid {key} value '{value}'")))
        };
        match key.trim() {
            "BIN_COUNT" => {
                let n = int()?;
                bin_count = Some(usize::try_from(n).map_err(|_| lines.error("negative BIN_COUNT"))?);
            }
            "MIN" => min = Some(int()?),
            "MAX" => max = Some(int()?),
            "MEAN" => mean = Some(int()?),
            "STDEV" => stdev = Some(int()?),
            other => return Err(lines.error(format!("invalid data point '{other}'"))),
        }
    }

    let missing = |what: &str| lines.error(format!("block for {parameter} is missing {what}"));
    let bin_count = bin_count.ok_or_else(|| missing("BIN_COUNT"))?;
    let min = min.ok_or_else(|| missing("MIN"))?;
    let max = max.ok_or_else(|| missing("MAX"))?;
    let mean = mean.ok_or_else(|| missing("MEAN"))?;
    let stdev = stdev.ok_or_else(|| missing("STDEV"))?;

    let bins = (0..bin_count)
        .map(|_| {
            let line = lines.expect_next("a bin line")?;
            parse_bin(line).ok_or_else(|| lines.error(format!("invalid bin line '{line}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EncodedDistribution {
        parameter,
        min,
        max,
        mean,
        stdev,
        bins,
    })
}

fn parse_bin(line: &str) -> Option<Bin> {
    let mut fields = line.split(',').map(str::trim);
    let bin = Bin {
        min: fields.next()?.parse().ok()?,
        max: fields.next()?.parse().ok()?,
        proportion: fields.next()?.parse().ok()?,
        mean: fields.next()?.parse().ok()?,
        stdev: fields.next()?.parse().ok()?,
    };
    match fields.next() {
        None => Some(bin),
        Some(_) => None,
    }
}
