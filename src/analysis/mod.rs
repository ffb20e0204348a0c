//! Structural views of a graph that sit beside evaluation.
pub mod topology;

pub use topology::{dependencies_of, dependents_of, to_dot, Topology};
