// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized display positions.
//!
//! A position is a finite value in `[0, 1]`. On the wire it travels as the
//! literal decimal text of the value, one value per UDP datagram.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// First unsigned decimal run in a datagram (`pos=0.7`, `0.42\n`). Signs and
/// a leading dot are not part of the match, so `-0.2` reads as `0.2` and
/// `.5` reads as `5`.
static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+\.?\d*").ok());

/// A validated position in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Position(f64);

/// Why a value was rejected as a position.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionError {
    /// The text does not contain a number.
    NotANumber(String),
    /// The number is NaN or outside `[0, 1]`.
    OutOfRange(f64),
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber(text) => write!(f, "not a number: {text:?}"),
            Self::OutOfRange(value) => write!(f, "{value} is out of range (must be between 0 and 1)"),
        }
    }
}

impl std::error::Error for PositionError {}

impl Position {
    pub const MIN: Position = Position(0.0);
    pub const MAX: Position = Position(1.0);

    pub fn new(value: f64) -> Result<Self, PositionError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PositionError::OutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Position as a percentage of the full travel.
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }

    /// Lenient parse used for inbound datagrams: extracts the first number
    /// in the text and falls back to parsing the whole trimmed text.
    pub fn extract(text: &str) -> Result<Self, PositionError> {
        let trimmed = text.trim();
        let found = NUMBER.as_ref().and_then(|re| re.find(trimmed)).map(|m| m.as_str());
        let value = found
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| trimmed.parse::<f64>().ok())
            .ok_or_else(|| PositionError::NotANumber(trimmed.to_owned()))?;
        Self::new(value)
    }
}

/// Strict parse: the whole trimmed text must be a number.
impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value =
            trimmed.parse::<f64>().map_err(|_| PositionError::NotANumber(trimmed.to_owned()))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for Position {
    type Error = PositionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for f64 {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// Shortest text that round-trips the value (`0.1`, `0.5`, `1`).
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod tests;
