//! Defines the `Node` and its associated types, representing a single
//! series-producing step in the flow model.

use crate::compute::kernel;
use crate::compute::ledger::{require, SeriesSource};
use crate::error::{EngineError, Result};
use crate::expr::{self, ExprNode};
use crate::pmf::Pmf;
use crate::series::{Series, TimeGrid};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A node identifier. Compared and hashed by value; clones share one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self { Self(Arc::from(s)) }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str { &self.0 }
}

/// Elementwise arithmetic shared by binary nodes and expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    /// Division by zero yields 0.0 for that bin.
    Div,
}

impl BinaryOperator {
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Sub => '-',
            BinaryOperator::Mul => '*',
            BinaryOperator::Div => '/',
        }
    }
}

/// Right-hand side of a binary node. A scalar is captured, not a graph edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Node(NodeId),
    Scalar(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Fixed input values; must match the grid length at evaluation.
    Const { values: Series },
    Binary { op: BinaryOperator, left: NodeId, right: Operand },
    /// Queue depth: `Q[t] = max(0, Q[t-1] + inflow[t] - outflow[t] - loss[t])`.
    Backlog {
        inflow: NodeId,
        outflow: NodeId,
        loss: Option<NodeId>,
        initial_depth: f64,
    },
    /// Causal lag.
    Shift { source: NodeId, lag: usize },
    Expr(ExprNode),
    /// Collapses the distribution to its expected value in every bin.
    Pmf { pmf: Pmf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    // Distinct, in first-seen order.
    inputs: SmallVec<[NodeId; 4]>,
    kind: NodeKind,
}

impl Node {
    fn with_kind(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        let mut inputs: SmallVec<[NodeId; 4]> = SmallVec::new();
        let mut push = |n: &NodeId| {
            if !inputs.contains(n) {
                inputs.push(n.clone());
            }
        };
        match &kind {
            NodeKind::Const { .. } | NodeKind::Pmf { .. } => {}
            NodeKind::Binary { left, right, .. } => {
                push(left);
                if let Operand::Node(r) = right {
                    push(r);
                }
            }
            NodeKind::Backlog { inflow, outflow, loss, .. } => {
                push(inflow);
                push(outflow);
                if let Some(l) = loss {
                    push(l);
                }
            }
            NodeKind::Shift { source, .. } => push(source),
            NodeKind::Expr(e) => e.inputs().iter().for_each(&mut push),
        }
        Self { id: id.into(), inputs, kind }
    }

    pub fn constant(id: impl Into<NodeId>, values: Vec<f64>) -> Self {
        Self::with_kind(id, NodeKind::Const { values: Series::new(values) })
    }

    pub fn binary(id: impl Into<NodeId>, op: BinaryOperator, left: impl Into<NodeId>, right: Operand) -> Self {
        Self::with_kind(id, NodeKind::Binary { op, left: left.into(), right })
    }

    pub fn backlog(
        id: impl Into<NodeId>,
        inflow: impl Into<NodeId>,
        outflow: impl Into<NodeId>,
        loss: Option<NodeId>,
        initial_depth: f64,
    ) -> Self {
        Self::with_kind(
            id,
            NodeKind::Backlog { inflow: inflow.into(), outflow: outflow.into(), loss, initial_depth },
        )
    }

    /// Fails when `lag` is negative: a shift may only read the past.
    pub fn shift(id: impl Into<NodeId>, source: impl Into<NodeId>, lag: i64) -> Result<Self> {
        let id = id.into();
        if lag < 0 {
            return Err(EngineError::NegativeLag { node: id, lag });
        }
        Ok(Self::with_kind(id, NodeKind::Shift { source: source.into(), lag: lag as usize }))
    }

    /// Parses and compiles `source` into an expression-backed node.
    pub fn expr(id: impl Into<NodeId>, source: &str) -> Result<Self> {
        let compiled = expr::compile(source)?;
        Ok(Self::with_kind(id, NodeKind::Expr(compiled)))
    }

    pub fn from_expr(id: impl Into<NodeId>, compiled: ExprNode) -> Self {
        Self::with_kind(id, NodeKind::Expr(compiled))
    }

    pub fn pmf(id: impl Into<NodeId>, pmf: Pmf) -> Self {
        Self::with_kind(id, NodeKind::Pmf { pmf })
    }

    pub fn id(&self) -> &NodeId { &self.id }
    pub fn inputs(&self) -> &[NodeId] { &self.inputs }
    pub fn kind(&self) -> &NodeKind { &self.kind }

    /// Produces this node's full-grid series from already-computed inputs.
    pub fn evaluate(&self, grid: &TimeGrid, inputs: &dyn SeriesSource) -> Result<Series> {
        let bins = grid.bins();
        match &self.kind {
            NodeKind::Const { values } => {
                if values.len() != bins {
                    return Err(EngineError::LengthMismatch {
                        node: self.id.clone(),
                        expected: bins,
                        actual: values.len(),
                    });
                }
                Ok(values.clone())
            }
            NodeKind::Binary { op, left, right } => {
                let lhs = require(inputs, &self.id, left)?;
                let out = match right {
                    Operand::Node(r) => {
                        let rhs = require(inputs, &self.id, r)?;
                        self.check_len(rhs, lhs.len())?;
                        kernel::elementwise(*op, lhs.as_slice(), rhs.as_slice())
                    }
                    Operand::Scalar(s) => kernel::elementwise_scalar(*op, lhs.as_slice(), *s),
                };
                Ok(Series::new(out))
            }
            NodeKind::Backlog { inflow, outflow, loss, initial_depth } => {
                let inflow = require(inputs, &self.id, inflow)?;
                let outflow = require(inputs, &self.id, outflow)?;
                let loss = match loss {
                    Some(l) => Some(require(inputs, &self.id, l)?),
                    None => None,
                };
                let depth = kernel::backlog(
                    bins,
                    *initial_depth,
                    inflow.as_slice(),
                    outflow.as_slice(),
                    loss.map(Series::as_slice),
                );
                Ok(Series::new(depth))
            }
            NodeKind::Shift { source, lag } => {
                let src = require(inputs, &self.id, source)?;
                Ok(kernel::shift(src, *lag))
            }
            NodeKind::Expr(e) => e.evaluate(&self.id, grid, inputs),
            NodeKind::Pmf { pmf } => Ok(Series::constant(bins, pmf.expected_value())),
        }
    }

    fn check_len(&self, s: &Series, expected: usize) -> Result<()> {
        if s.len() != expected {
            return Err(EngineError::LengthMismatch { node: self.id.clone(), expected, actual: s.len() });
        }
        Ok(())
    }
}
