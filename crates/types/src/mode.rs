//! Steering aggressiveness mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How aggressively a context steers clients.
///
/// - `Off`: the context is inert; no frames, no timers.
/// - `Suggest`: steer politely via 802.11v BSS Transition Requests only;
///   never touch the blacklist.
/// - `Force`: blacklist losing clients and deauthenticate them when they
///   do not support BSS Transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteeringMode {
    #[default]
    Off,
    Suggest,
    Force,
}

/// Error parsing a [`SteeringMode`] from its config string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid steering mode {input:?} (expected off, suggest, or force)")]
pub struct ModeParseError {
    input: String,
}

impl SteeringMode {
    /// The config string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SteeringMode::Off => "off",
            SteeringMode::Suggest => "suggest",
            SteeringMode::Force => "force",
        }
    }
}

impl fmt::Display for SteeringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SteeringMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(SteeringMode::Off),
            "suggest" => Ok(SteeringMode::Suggest),
            "force" => Ok(SteeringMode::Force),
            other => Err(ModeParseError {
                input: other.to_string(),
            }),
        }
    }
}
