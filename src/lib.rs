//! Deterministic, time-binned dataflow evaluation.
//!
//! A model is a set of named nodes over a fixed [`TimeGrid`]. Each node
//! produces one [`Series`] with a value per bin. Nodes are evaluated once, in
//! topological order, and every result is memoized for the downstream nodes
//! that read it.

pub mod analysis;
pub mod compute;
pub mod display;
pub mod error;
pub mod expr;
pub mod graph;
pub mod model;
pub mod pmf;
pub mod policy;
pub mod rng;
pub mod series;

pub use compute::evaluate_batch;
pub use error::{EngineError, Result};
pub use expr::{Expr, ExprNode, ParseError};
pub use graph::{BinaryOperator, Graph, Node, NodeId, NodeKind, Operand};
pub use model::{evaluate_model, ModelDefinition, ModelRun};
pub use pmf::{Pmf, PmfCompiler, PmfCompilerOptions, PmfError};
pub use policy::{RetryKernelLimits, RetryKernelPolicy};
pub use rng::Pcg32;
pub use series::{BinUnit, Series, TimeGrid};
