//! grid.rs
//! Equal-size time bins. Bounds are checked once, at construction.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_BINS: usize = 10_000;
pub const MAX_BIN_SIZE: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinUnit {
    #[serde(alias = "Minutes", alias = "minute")]
    Minutes,
    #[serde(alias = "Hours", alias = "hour")]
    Hours,
    #[serde(alias = "Days", alias = "day")]
    Days,
    #[serde(alias = "Weeks", alias = "week")]
    Weeks,
}

impl BinUnit {
    /// Length of one unit in minutes.
    pub fn minutes(self) -> u64 {
        match self {
            BinUnit::Minutes => 1,
            BinUnit::Hours => 60,
            BinUnit::Days => 1_440,
            BinUnit::Weeks => 10_080,
        }
    }
}

impl FromStr for BinUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "minutes" => Ok(BinUnit::Minutes),
            "hour" | "hours" => Ok(BinUnit::Hours),
            "day" | "days" => Ok(BinUnit::Days),
            "week" | "weeks" => Ok(BinUnit::Weeks),
            other => Err(EngineError::InvalidGrid(format!("unknown bin unit '{}'", other))),
        }
    }
}

impl fmt::Display for BinUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinUnit::Minutes => "minutes",
            BinUnit::Hours => "hours",
            BinUnit::Days => "days",
            BinUnit::Weeks => "weeks",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeGrid {
    bins: usize,
    bin_size: u32,
    bin_unit: BinUnit,
}

impl TimeGrid {
    pub fn new(bins: usize, bin_size: u32, bin_unit: BinUnit) -> Result<Self> {
        if bins < 1 || bins > MAX_BINS {
            return Err(EngineError::InvalidGrid(format!(
                "bins must be between 1 and {}, got {}",
                MAX_BINS, bins
            )));
        }
        if bin_size < 1 || bin_size > MAX_BIN_SIZE {
            return Err(EngineError::InvalidGrid(format!(
                "bin size must be between 1 and {}, got {}",
                MAX_BIN_SIZE, bin_size
            )));
        }
        Ok(Self { bins, bin_size, bin_unit })
    }

    #[inline(always)]
    pub fn bins(&self) -> usize { self.bins }
    pub fn bin_size(&self) -> u32 { self.bin_size }
    pub fn bin_unit(&self) -> BinUnit { self.bin_unit }

    pub fn bin_minutes(&self) -> u64 {
        self.bin_size as u64 * self.bin_unit.minutes()
    }

    pub fn total_minutes(&self) -> u64 {
        self.bins as u64 * self.bin_minutes()
    }
}
