//! Maps a `ModelDefinition` onto a validated grid and graph.

use super::definition::{ModelDefinition, NodeSpec};
use crate::error::{EngineError, Result};
use crate::expr::{Expr, ExprNode};
use crate::graph::{Graph, Node, NodeId, Operand};
use crate::pmf::{PmfCompiler, PmfCompilerOptions, PmfError};
use crate::policy::RetryKernelPolicy;
use crate::series::{Series, TimeGrid};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub grid: TimeGrid,
    pub graph: Graph,
    /// Non-fatal notices from PMF compilation and retry-kernel normalization.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModelRun {
    pub grid: TimeGrid,
    pub order: Vec<NodeId>,
    pub series: HashMap<NodeId, Series>,
    pub warnings: Vec<String>,
}

pub struct ModelBuilder {
    retry_policy: RetryKernelPolicy,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self { retry_policy: RetryKernelPolicy::default() }
    }
}

impl ModelBuilder {
    pub fn new(retry_policy: RetryKernelPolicy) -> Self {
        Self { retry_policy }
    }

    pub fn build(&self, def: &ModelDefinition) -> Result<BuiltModel> {
        let grid = TimeGrid::new(def.grid.bins, def.grid.bin_size, def.grid.bin_unit)?;
        let mut warnings = Vec::new();
        let mut nodes = Vec::with_capacity(def.nodes.len());

        for spec in &def.nodes {
            nodes.push(self.build_node(spec, &mut warnings)?);
        }

        let graph = Graph::new(nodes)?;
        debug!(nodes = graph.len(), warnings = warnings.len(), "model built");
        Ok(BuiltModel { grid, graph, warnings })
    }

    pub fn evaluate(&self, def: &ModelDefinition) -> Result<ModelRun> {
        let BuiltModel { grid, graph, warnings } = self.build(def)?;
        let series = graph.evaluate(&grid)?;
        Ok(ModelRun { grid, order: graph.topological_order(), series, warnings })
    }

    fn build_node(&self, spec: &NodeSpec, warnings: &mut Vec<String>) -> Result<Node> {
        let node = match spec {
            NodeSpec::Const { id, values } => Node::constant(id.as_str(), values.clone()),
            NodeSpec::Expr { id, expr } => Node::expr(id.as_str(), expr)?,
            NodeSpec::Pmf { id, pmf } => {
                if pmf.values.len() != pmf.probabilities.len() {
                    return Err(PmfError::LengthMismatch {
                        values: pmf.values.len(),
                        probabilities: pmf.probabilities.len(),
                    }
                    .into());
                }
                let entries: Vec<(f64, f64)> =
                    pmf.values.iter().copied().zip(pmf.probabilities.iter().copied()).collect();
                let compiled = PmfCompiler::compile(&entries, id, &PmfCompilerOptions::default())?;
                warnings.extend(compiled.warnings);
                Node::pmf(id.as_str(), compiled.pmf)
            }
            NodeSpec::Backlog { id, inflow, outflow, loss, initial_depth } => Node::backlog(
                id.as_str(),
                inflow.as_str(),
                outflow.as_str(),
                loss.as_deref().map(NodeId::from),
                *initial_depth,
            ),
            NodeSpec::Shift { id, source, lag } => Node::shift(id.as_str(), source.as_str(), *lag)?,
            NodeSpec::Binary { id, op, left, right, scalar } => {
                let operand = match (right, scalar) {
                    (Some(r), None) => Operand::Node(NodeId::from(r.as_str())),
                    (None, Some(s)) => Operand::Scalar(*s),
                    _ => {
                        return Err(EngineError::Model(format!(
                            "binary node '{}' needs exactly one of 'right' or 'scalar'",
                            id
                        )))
                    }
                };
                Node::binary(id.as_str(), *op, left.as_str(), operand)
            }
            NodeSpec::Retry { id, source, kernel } => {
                let result = self.retry_policy.apply(kernel.as_deref());
                warnings.extend(result.messages.into_iter().map(|m| format!("{}: {}", id, m)));
                let ast = Expr::call(
                    "CONV",
                    vec![Expr::NodeRef(NodeId::from(source.as_str())), Expr::Array(result.kernel)],
                );
                Node::from_expr(id.as_str(), ExprNode::from_ast(ast))
            }
        };
        Ok(node)
    }
}

/// Builds and evaluates `def` with the default policies.
pub fn evaluate_model(def: &ModelDefinition) -> Result<ModelRun> {
    ModelBuilder::default().evaluate(def)
}
