//! Model definitions and their mapping onto the engine.
pub mod builder;
pub mod definition;

pub use builder::{evaluate_model, BuiltModel, ModelBuilder, ModelRun};
pub use definition::{GridSpec, ModelDefinition, NodeSpec, PmfSpec};
