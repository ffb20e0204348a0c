//! Executes the node graph.
pub mod batch;
pub mod engine;
pub mod kernel;
pub mod ledger;

pub use batch::evaluate_batch;
pub use engine::Evaluator;
pub use ledger::{Ledger, SeriesSource};
