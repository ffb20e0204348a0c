//! Numeric substrate: the time grid and the fixed-length series aligned to it.
pub mod grid;
pub mod series;

pub use grid::{BinUnit, TimeGrid};
pub use series::Series;
