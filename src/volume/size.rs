//! Capacity units and byte conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capacity unit accepted for the `size` parameter. Every step is a power
/// of 1024.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Bytes.
    B,
    /// Kibibytes.
    Kb,
    /// Mebibytes.
    #[default]
    Mb,
    /// Gibibytes.
    Gb,
    /// Tebibytes.
    Tb,
    /// Pebibytes.
    Pb,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    #[must_use]
    pub const fn multiplier(self) -> u64 {
        match self {
            Self::B => 1,
            Self::Kb => 1 << 10,
            Self::Mb => 1 << 20,
            Self::Gb => 1 << 30,
            Self::Tb => 1 << 40,
            Self::Pb => 1 << 50,
        }
    }

    /// Lower-case label used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::B => "b",
            Self::Kb => "kb",
            Self::Mb => "mb",
            Self::Gb => "gb",
            Self::Tb => "tb",
            Self::Pb => "pb",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeUnit {
    type Err = SizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "b" => Ok(Self::B),
            "kb" => Ok(Self::Kb),
            "mb" => Ok(Self::Mb),
            "gb" => Ok(Self::Gb),
            "tb" => Ok(Self::Tb),
            "pb" => Ok(Self::Pb),
            _ => Err(SizeError::UnknownUnit(value.to_owned())),
        }
    }
}

/// Errors raised while converting a size to bytes.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SizeError {
    /// The size is not a non-negative integer.
    #[error("Invalid value for [size]: {0}")]
    NotNumeric(String),
    /// The unit is not one of `b`, `kb`, `mb`, `gb`, `tb`, `pb`.
    #[error("Invalid value for [unit]: {0}")]
    UnknownUnit(String),
    /// The byte count does not fit in 64 bits.
    #[error("Invalid value for [size]: {size}{unit} is too large to represent")]
    Overflow {
        /// Requested size.
        size: u64,
        /// Requested unit.
        unit: SizeUnit,
    },
}

/// Converts `size` expressed in `unit` to bytes.
///
/// # Errors
///
/// Returns [`SizeError::NotNumeric`] when `size` is not an integer and
/// [`SizeError::Overflow`] when the result exceeds `u64::MAX`.
pub fn convert_to_bytes(size: &str, unit: SizeUnit) -> Result<u64, SizeError> {
    let trimmed = size.trim();
    let amount: u64 = trimmed
        .parse()
        .map_err(|_| SizeError::NotNumeric(trimmed.to_owned()))?;
    amount
        .checked_mul(unit.multiplier())
        .ok_or(SizeError::Overflow { size: amount, unit })
}
