//! Model definition DTOs, as produced by an external YAML/JSON layer.

use crate::error::{EngineError, Result};
use crate::graph::BinaryOperator;
use crate::series::BinUnit;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDefinition {
    pub grid: GridSpec,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl ModelDefinition {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::Model(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub bins: usize,
    pub bin_size: u32,
    pub bin_unit: BinUnit,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PmfSpec {
    pub values: Vec<f64>,
    pub probabilities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeSpec {
    Const {
        id: String,
        values: Vec<f64>,
    },
    Expr {
        id: String,
        expr: String,
    },
    Pmf {
        id: String,
        pmf: PmfSpec,
    },
    Backlog {
        id: String,
        inflow: String,
        outflow: String,
        #[serde(default)]
        loss: Option<String>,
        #[serde(default, rename = "initialDepth")]
        initial_depth: f64,
    },
    Shift {
        id: String,
        source: String,
        lag: i64,
    },
    /// Exactly one of `right` and `scalar` must be given.
    Binary {
        id: String,
        op: BinaryOperator,
        left: String,
        #[serde(default)]
        right: Option<String>,
        #[serde(default)]
        scalar: Option<f64>,
    },
    /// Convolves `source` with a policy-normalized retry kernel.
    Retry {
        id: String,
        source: String,
        #[serde(default)]
        kernel: Option<Vec<f64>>,
    },
}

impl NodeSpec {
    pub fn id(&self) -> &str {
        match self {
            NodeSpec::Const { id, .. }
            | NodeSpec::Expr { id, .. }
            | NodeSpec::Pmf { id, .. }
            | NodeSpec::Backlog { id, .. }
            | NodeSpec::Shift { id, .. }
            | NodeSpec::Binary { id, .. }
            | NodeSpec::Retry { id, .. } => id,
        }
    }
}
