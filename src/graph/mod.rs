//! Defines the core data structures for the computation graph.
pub mod dag;
pub mod node;
pub mod storage;

// Re-export key types for convenient access
pub use dag::Graph;
pub use node::{BinaryOperator, Node, NodeId, NodeKind, Operand};
