//! Parsing of raw log lines into a [`ParameterSet`].
//!
//! Two dialects are supported, selected by looking at the first line:
//! - [`Dialect::Tagged`]: `PARAM: <key> - <value>` lines mixed with ordinary program output, plus
//!   `setup called` / `update called` event lines;
//! - [`Dialect::Tokenized`]: a header line followed by `|`-delimited numeric rows.
//!
//! Malformed values are expected in real logs and are dropped without error.

use crate::{Error, Parameter, ParameterSet, Result};
use std::{fs, path::Path};

/// Marker that a tagged-dialect line must contain to contribute a value.
pub const PARAM_MARKER: &str = "PARAM";

/// Field separator of the tokenized dialect; its presence on the first line selects that dialect.
pub const FIELD_SEPARATOR: char = '|';

//=================
// Dialect

/// Raw log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Key/value lines tagged with [`PARAM_MARKER`].
    Tagged,
    /// Header line followed by [`FIELD_SEPARATOR`]-delimited rows.
    Tokenized,
}

impl Dialect {
    /// Selects the dialect from the first line of a log.
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains(FIELD_SEPARATOR) {
            Dialect::Tokenized
        } else {
            Dialect::Tagged
        }
    }
}

/// Fixed column positions (0-based) of the tokenized dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizedColumns {
    pub local_size: usize,
    pub remote_size: usize,
    pub partner_count: usize,
}

impl Default for TokenizedColumns {
    /// Column 0 holds the rank; local size, remote size and partner count follow it.
    fn default() -> Self {
        Self {
            local_size: 1,
            remote_size: 2,
            partner_count: 3,
        }
    }
}

//=================
// Tagged dialect

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKey {
    Scalar(Parameter),
    IndicesNeeded,
    SetupCalled,
    UpdateCalled,
}

/// Keys matched against lower-cased lines, in priority order.
const TAG_KEYS: [(&str, TagKey); 8] = [
    ("nowned", TagKey::Scalar(Parameter::NOwned)),
    ("nremote", TagKey::Scalar(Parameter::NRemote)),
    ("num_comm_partners", TagKey::Scalar(Parameter::CommPartners)),
    ("blocksize", TagKey::Scalar(Parameter::BlockSize)),
    ("stride", TagKey::Scalar(Parameter::Stride)),
    ("indices_needed", TagKey::IndicesNeeded),
    ("setup called", TagKey::SetupCalled),
    ("update called", TagKey::UpdateCalled),
];

/// A relevant tagged-dialect line, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedLine {
    /// A single value for a parameter.
    Scalar(Parameter, i64),
    /// Strides derived from an ordered list of needed indices: the difference of every adjacent pair.
    Strides(Vec<i64>),
    /// Start of a new update cycle.
    SetupCalled,
    /// One update within the current cycle.
    UpdateCalled,
}

impl TaggedLine {
    /// Classifies a raw line, returning `None` for irrelevant or malformed lines.
    ///
    /// Value-bearing lines (scalars and `indices_needed`) must carry [`PARAM_MARKER`] so that ordinary program
    /// output mentioning a key is not harvested. Event lines (`setup called`, `update called`) are recognized
    /// with or without the marker.
    pub fn classify(line: &str) -> Option<Self> {
        let has_marker = line.contains(PARAM_MARKER);
        let lower = line.to_lowercase();
        let key = TAG_KEYS
            .iter()
            .find(|(name, _)| lower.contains(name))
            .map(|&(_, key)| key)?;

        match key {
            TagKey::Scalar(param) if has_marker => {
                // The value is the field between the first and second `-`; trailing annotations are ignored.
                let value = lower.split('-').nth(1)?;
                parse_count(value).map(|v| TaggedLine::Scalar(param, v))
            }
            TagKey::IndicesNeeded if has_marker => {
                let (_, rest) = lower.split_once('-')?;
                let indices = rest
                    .split_whitespace()
                    .map(|tok| tok.parse::<i64>().ok())
                    .collect::<Option<Vec<_>>>()?;
                // A difference that does not fit in an `i64` drops the whole line.
                indices
                    .windows(2)
                    .map(|w| w[1].checked_sub(w[0]))
                    .collect::<Option<Vec<_>>>()
                    .map(TaggedLine::Strides)
            }
            TagKey::Scalar(_) | TagKey::IndicesNeeded => None,
            TagKey::SetupCalled => Some(TaggedLine::SetupCalled),
            TagKey::UpdateCalled => Some(TaggedLine::UpdateCalled),
        }
    }
}

/// Parses a pure non-negative integer string (surrounding whitespace allowed).
fn parse_count(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Accumulator of the sequential fold over tagged lines.
#[derive(Debug)]
struct TaggedAcc {
    params: Vec<(Parameter, Vec<i64>)>,
    orphan_updates: usize,
}

impl TaggedAcc {
    fn new() -> Self {
        Self {
            params: Parameter::ALL.iter().map(|&p| (p, Vec::new())).collect(),
            orphan_updates: 0,
        }
    }

    fn list(&mut self, param: Parameter) -> &mut Vec<i64> {
        // `params` is indexed by canonical position.
        &mut self.params[param as usize].1
    }

    fn apply(mut self, line: TaggedLine) -> Self {
        match line {
            TaggedLine::Scalar(param, v) => self.list(param).push(v),
            TaggedLine::Strides(strides) => self.list(Parameter::Stride).extend(strides),
            TaggedLine::SetupCalled => self.list(Parameter::UpdatesPerSetup).push(0),
            TaggedLine::UpdateCalled => match self.list(Parameter::UpdatesPerSetup).last_mut() {
                Some(counter) => *counter += 1,
                None => self.orphan_updates += 1,
            },
        }
        self
    }

    fn finish(self) -> ParameterSet {
        if self.orphan_updates > 0 {
            log::warn!(
                "ignored {} `update called` line(s) preceding the first `setup called`",
                self.orphan_updates
            );
        }
        self.params.into_iter().collect()
    }
}

fn ingest_tagged<S: AsRef<str>>(lines: impl Iterator<Item = S>) -> ParameterSet {
    log::trace!("entering `ingest_tagged`");
    lines
        .filter_map(|line| TaggedLine::classify(line.as_ref()))
        .fold(TaggedAcc::new(), TaggedAcc::apply)
        .finish()
}

//=================
// Tokenized dialect

/// One parsed row of the tokenized dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizedRow {
    pub local_size: i64,
    pub remote_size: i64,
    pub partner_count: i64,
}

impl TokenizedRow {
    /// Parses a `|`-delimited row, returning `None` if any mapped column is missing or malformed, or if the
    /// local and remote sizes overflow when summed.
    pub fn parse(line: &str, columns: TokenizedColumns) -> Option<Self> {
        let mut fields: Vec<&str> = line.trim_end().split(FIELD_SEPARATOR).collect();
        if fields.last().is_some_and(|f| f.trim().is_empty()) {
            fields.pop();
        }
        let field = |idx: usize| fields.get(idx).and_then(|f| parse_count(f));
        let row = Self {
            local_size: field(columns.local_size)?,
            remote_size: field(columns.remote_size)?,
            partner_count: field(columns.partner_count)?,
        };
        // NOwned is the sum of the two sizes and must fit in an `i64`.
        row.local_size.checked_add(row.remote_size)?;
        Some(row)
    }
}

fn ingest_tokenized<S: AsRef<str>>(
    lines: impl Iterator<Item = S>,
    columns: TokenizedColumns,
) -> ParameterSet {
    log::trace!("entering `ingest_tokenized`");
    // The first line is the header.
    let rows: Vec<TokenizedRow> = lines
        .skip(1)
        .filter_map(|line| TokenizedRow::parse(line.as_ref(), columns))
        .collect();

    ParameterSet::from_fn(|p| match p {
        Parameter::NOwned => rows.iter().map(|r| r.local_size + r.remote_size).collect(),
        Parameter::NRemote => rows.iter().map(|r| r.local_size).collect(),
        Parameter::CommPartners => rows.iter().map(|r| r.partner_count).collect(),
        _ => Vec::new(),
    })
}

//=================
// Entry points

/// Parses an ordered sequence of log lines into a [`ParameterSet`], auto-detecting the [`Dialect`] from the
/// first line. An empty input yields a [`ParameterSet`] with all lists empty.
///
/// Lines are consumed strictly in order: the `setup called` / `update called` counting depends on it.
pub fn ingest_lines<I, S>(lines: I, columns: TokenizedColumns) -> ParameterSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter().peekable();
    let dialect = match lines.peek() {
        Some(first) => Dialect::detect(first.as_ref()),
        None => return ParameterSet::empty(),
    };
    log::debug!("detected {dialect:?} dialect");

    let params = match dialect {
        Dialect::Tagged => ingest_tagged(lines),
        Dialect::Tokenized => ingest_tokenized(lines, columns),
    };
    for (param, samples) in &params {
        log::debug!("ingested {} sample(s) for {param}", samples.len());
    }
    params
}

/// Reads the log at `path` and parses it with [`ingest_lines`]. Invalid UTF-8 is replaced rather than rejected.
pub fn ingest_file(path: impl AsRef<Path>, columns: TokenizedColumns) -> Result<ParameterSet> {
    let path = path.as_ref();
    log::trace!("entering `ingest_file` for {}", path.display());
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(ingest_lines(text.lines(), columns))
}
