//! compiler.rs
//! Turns raw (value, probability) pairs into a validated `Pmf`, aligns it to
//! the grid, and optionally draws one deterministic sample per bin.
//!
//! Three phases, in order:
//! 1. Validation: structural errors fail, a loose sum renormalizes with a warning.
//! 2. Grid alignment: only with `grid_bins`; governed by `RepeatPolicy`.
//! 3. Sampling: only with `grid_bins`; a fresh `Pcg32` seeded from the options.

use super::distribution::Pmf;
use super::error::PmfError;
use crate::rng::Pcg32;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPolicy {
    /// Any length mismatch with the grid is an error.
    #[default]
    Error,
    /// The PMF may be tiled when its length evenly divides the grid.
    Repeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PmfCompilerOptions {
    pub repeat_policy: RepeatPolicy,
    pub seed: i32,
    pub grid_bins: Option<usize>,
    pub normalization_tolerance: f64,
}

impl Default for PmfCompilerOptions {
    fn default() -> Self {
        Self {
            repeat_policy: RepeatPolicy::Error,
            seed: 42,
            grid_bins: None,
            normalization_tolerance: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPmf {
    pub pmf: Pmf,
    /// One sample per bin; present only when `grid_bins` was set.
    pub series: Option<Series>,
    pub warnings: Vec<String>,
}

pub struct PmfCompiler;

impl PmfCompiler {
    #[instrument(skip_all, fields(name = %name, entries = entries.len()))]
    pub fn compile(
        entries: &[(f64, f64)],
        name: &str,
        options: &PmfCompilerOptions,
    ) -> Result<CompiledPmf, PmfError> {
        let mut warnings = Vec::new();

        let pmf = Self::validate(entries, name, options, &mut warnings)?;

        let series = match options.grid_bins {
            Some(bins) => {
                Self::align(&pmf, name, bins, options.repeat_policy, &mut warnings)?;
                Some(Self::sample_series(&pmf, bins, options.seed))
            }
            None => None,
        };

        for w in &warnings {
            warn!("{}", w);
        }
        debug!(expected_value = pmf.expected_value(), sampled = series.is_some(), "pmf compiled");

        Ok(CompiledPmf { pmf, series, warnings })
    }

    fn validate(
        entries: &[(f64, f64)],
        name: &str,
        options: &PmfCompilerOptions,
        warnings: &mut Vec<String>,
    ) -> Result<Pmf, PmfError> {
        if entries.is_empty() {
            return Err(PmfError::Empty);
        }
        let sum: f64 = entries.iter().map(|&(_, p)| p).sum();
        // `Pmf` performs the full structural validation and the division itself.
        let pmf = Pmf::from_entries(entries.iter().copied())?;
        if (sum - 1.0).abs() > options.normalization_tolerance {
            warnings.push(format!(
                "PMF '{}' probabilities summed to {:.6}; renormalized to 1.0",
                name, sum
            ));
        }
        Ok(pmf)
    }

    fn align(
        pmf: &Pmf,
        name: &str,
        bins: usize,
        policy: RepeatPolicy,
        warnings: &mut Vec<String>,
    ) -> Result<(), PmfError> {
        let len = pmf.len();
        if bins == 0 {
            return Err(PmfError::GridMismatch { name: name.to_string(), len, bins });
        }
        if len == bins {
            return Ok(());
        }
        match policy {
            RepeatPolicy::Error => Err(PmfError::GridMismatch { name: name.to_string(), len, bins }),
            RepeatPolicy::Repeat => {
                if bins % len != 0 {
                    return Err(PmfError::NotDivisible { name: name.to_string(), len, bins });
                }
                warnings.push(format!(
                    "PMF '{}' with {} entries tiled {} times to cover {} bins",
                    name,
                    len,
                    bins / len,
                    bins
                ));
                Ok(())
            }
        }
    }

    fn sample_series(pmf: &Pmf, bins: usize, seed: i32) -> Series {
        let mut rng = Pcg32::new(seed);
        let samples = (0..bins).map(|_| pmf.sample(&mut rng)).collect();
        Series::new(samples)
    }
}
