//! Enumeration types for the Emojigen service.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Subscription classification of a caller.
///
/// Only stored; no operation in this service branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Tier {
    /// Default tier for every new profile.
    #[default]
    Free,
    /// Paid subscription.
    Pro,
}

impl Tier {
    /// The lowercase database and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier string that is neither `free` nor `pro`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(UnknownTier(other.to_owned())),
        }
    }
}
