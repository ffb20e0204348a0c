//! Defines the error types for the PMF module.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PmfError {
    #[error("PMF must contain at least one entry")]
    Empty,
    #[error("PMF has {values} values but {probabilities} probabilities")]
    LengthMismatch { values: usize, probabilities: usize },
    #[error("PMF value {0} appears more than once")]
    DuplicateValue(f64),
    #[error("PMF probability for value {value} is negative ({probability})")]
    NegativeProbability { value: f64, probability: f64 },
    #[error("PMF entry ({value}, {probability}) is not finite")]
    NonFinite { value: f64, probability: f64 },
    #[error("PMF probabilities must sum to a positive number, got {0}")]
    NonPositiveSum(f64),
    #[error("PMF '{name}' has {len} entries but the grid has {bins} bins")]
    GridMismatch { name: String, len: usize, bins: usize },
    #[error("PMF '{name}' has {len} entries, which does not evenly divide {bins} bins")]
    NotDivisible { name: String, len: usize, bins: usize },
}
