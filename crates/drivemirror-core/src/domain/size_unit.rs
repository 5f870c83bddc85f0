//! Human-readable size units for progress reporting

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

/// Binary size unit (powers of 1024)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
}

impl SizeUnit {
    /// Pick the largest unit that keeps `bytes` at or above 1
    pub fn for_size(bytes: u64) -> Self {
        if bytes < KIB {
            SizeUnit::B
        } else if bytes < MIB {
            SizeUnit::KB
        } else if bytes < GIB {
            SizeUnit::MB
        } else {
            SizeUnit::GB
        }
    }

    pub fn divisor(&self) -> f64 {
        match self {
            SizeUnit::B => 1.0,
            SizeUnit::KB => KIB as f64,
            SizeUnit::MB => MIB as f64,
            SizeUnit::GB => GIB as f64,
        }
    }

    /// Express `bytes` in this unit
    pub fn convert(&self, bytes: u64) -> f64 {
        bytes as f64 / self.divisor()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(SizeUnit::B),
            "KB" => Ok(SizeUnit::KB),
            "MB" => Ok(SizeUnit::MB),
            "GB" => Ok(SizeUnit::GB),
            other => Err(DomainError::InvalidSizeUnit(other.to_string())),
        }
    }
}

/// Label of the unit best suited to display `bytes`
pub fn size_unit(bytes: u64) -> &'static str {
    SizeUnit::for_size(bytes).as_str()
}

/// Convert `bytes` to the unit named by `unit`; unrecognised labels leave
/// the value in bytes
pub fn convert(bytes: u64, unit: &str) -> f64 {
    unit.parse::<SizeUnit>()
        .map(|u| u.convert(bytes))
        .unwrap_or(bytes as f64)
}
