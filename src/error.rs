//! Crate-wide error type.
//!
//! Structural problems (grid bounds, cycles, malformed expressions, invalid
//! distributions) fail hard through `EngineError`. Numeric degradation such as
//! division by zero is handled inside the kernels and never surfaces here.

use crate::expr::ParseError;
use crate::graph::NodeId;
use crate::pmf::PmfError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid time grid: {0}")]
    InvalidGrid(String),
    #[error("Shift lag must be non-negative, got {lag} at node '{node}'")]
    NegativeLag { node: NodeId, lag: i64 },
    #[error("Length mismatch at node '{node}': expected {expected} bins, got {actual}")]
    LengthMismatch { node: NodeId, expected: usize, actual: usize },
    #[error("Graph is not acyclic: {unresolved} node(s) could not be ordered")]
    GraphCycle { unresolved: usize },
    #[error("Duplicate node id '{0}'")]
    DuplicateNode(NodeId),
    #[error("Input '{input}' of node '{node}' has not been computed")]
    MissingInput { node: NodeId, input: NodeId },
    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArgumentCount { function: String, expected: usize, actual: usize },
    #[error("Invalid argument to {function}: {message}")]
    InvalidArgument { function: String, message: String },
    #[error("Invalid range: min ({min}) must be less than max ({max})")]
    InvalidRange { min: i32, max: i32 },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Pmf(#[from] PmfError),
    #[error("Model error: {0}")]
    Model(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
