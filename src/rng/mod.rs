//! Deterministic random number generation.
pub mod pcg32;

pub use pcg32::{Pcg32, Pcg32State};
