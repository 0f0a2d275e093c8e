//! The fixed set of communication-pattern parameters.

use crate::Error;
use std::{fmt::Display, str::FromStr};

/// A measured communication-pattern quantity.
///
/// The declaration order is the canonical parameter order: [`ParamMap`](crate::ParamMap)s iterate in this order
/// and interchange files list their blocks in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    /// Number of owned cells.
    NOwned,
    /// Number of remote (ghost) cells.
    NRemote,
    /// Block size of a communicated message.
    BlockSize,
    /// Difference between consecutive needed indices.
    Stride,
    /// Number of communication partners.
    CommPartners,
    /// Number of updates performed between consecutive setups.
    UpdatesPerSetup,
}

impl Parameter {
    /// All parameters in canonical order.
    pub const ALL: [Parameter; 6] = [
        Parameter::NOwned,
        Parameter::NRemote,
        Parameter::BlockSize,
        Parameter::Stride,
        Parameter::CommPartners,
        Parameter::UpdatesPerSetup,
    ];

    /// Name used in the `PARAM:` header of interchange file blocks.
    pub fn config_name(self) -> &'static str {
        match self {
            Parameter::NOwned => "nowned",
            Parameter::NRemote => "nremote",
            Parameter::BlockSize => "blocksize",
            Parameter::Stride => "stride",
            Parameter::CommPartners => "comm_partners",
            Parameter::UpdatesPerSetup => "updates_per_setup",
        }
    }

    /// Key under which the parameter is reported in tagged-dialect log lines, if it is reported as a
    /// single value. [`Parameter::UpdatesPerSetup`] is derived from `setup called` / `update called` events instead.
    pub fn tag_key(self) -> Option<&'static str> {
        match self {
            Parameter::NOwned => Some("nowned"),
            Parameter::NRemote => Some("nremote"),
            Parameter::BlockSize => Some("blocksize"),
            Parameter::Stride => Some("stride"),
            Parameter::CommPartners => Some("num_comm_partners"),
            Parameter::UpdatesPerSetup => None,
        }
    }

    /// Human-readable label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Parameter::NOwned => "N-Owned",
            Parameter::NRemote => "N-Remote",
            Parameter::BlockSize => "Blocksize",
            Parameter::Stride => "Stride",
            Parameter::CommPartners => "comm_partners",
            Parameter::UpdatesPerSetup => "updates_per_setup",
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Parameter {
    type Err = Error;

    /// Parses a [`Parameter::config_name`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.config_name() == s)
            .ok_or_else(|| Error::UnknownParameter(s.to_owned()))
    }
}
