//! Bullish/bearish hypothesis under test.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Candidate trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Bullish.
    Call,
    /// Bearish.
    Put,
}

impl Direction {
    /// True when `lead` sits on the side of `reference` this direction asks for:
    /// strictly above for [`Direction::Call`], strictly below for [`Direction::Put`].
    pub fn confirms(self, lead: f64, reference: f64) -> bool {
        match self {
            Direction::Call => lead > reference,
            Direction::Put => lead < reference,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Call => "CALL",
            Direction::Put => "PUT",
        })
    }
}

/// Input that is neither CALL nor PUT.
#[derive(Debug, Error)]
#[error("unknown direction '{0}', expected CALL or PUT")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "bullish" => Ok(Direction::Call),
            "put" | "bearish" => Ok(Direction::Put),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
