//! Compiles an expression into a node payload: the AST plus its dependencies.

use super::ast::Expr;
use super::error::ParseError;
use super::evaluator;
use super::parser;
use crate::compute::SeriesSource;
use crate::error::Result;
use crate::graph::NodeId;
use crate::series::{Series, TimeGrid};

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    source: String,
    ast: Expr,
    inputs: Vec<NodeId>,
}

/// Parses `source` and collects its distinct node references.
pub fn compile(source: &str) -> Result<ExprNode, ParseError> {
    let ast = parser::parse(source)?;
    Ok(ExprNode::new(source.to_string(), ast))
}

impl ExprNode {
    fn new(source: String, ast: Expr) -> Self {
        let mut inputs: Vec<NodeId> = Vec::new();
        ast.visit_refs(&mut |id| {
            if !inputs.contains(id) {
                inputs.push(id.clone());
            }
        });
        Self { source, ast, inputs }
    }

    /// Wraps an already-built tree; the source text is its rendering.
    pub fn from_ast(ast: Expr) -> Self {
        Self::new(ast.to_string(), ast)
    }

    pub fn source(&self) -> &str { &self.source }
    pub fn ast(&self) -> &Expr { &self.ast }
    pub fn inputs(&self) -> &[NodeId] { &self.inputs }

    pub fn evaluate(&self, owner: &NodeId, grid: &TimeGrid, inputs: &dyn SeriesSource) -> Result<Series> {
        evaluator::evaluate(&self.ast, owner, grid, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_are_distinct() {
        let node = compile("a * a + MIN(b, SHIFT(a, 1)) / c").unwrap();
        let ids: Vec<&str> = node.inputs().iter().map(|n| n.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_function_names_are_not_inputs() {
        let node = compile("CONV(x, [1, 2]) + 3").unwrap();
        assert_eq!(node.inputs(), &[NodeId::from("x")]);
        assert!(compile("1 + 2").unwrap().inputs().is_empty());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = compile("a +* b").unwrap_err();
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_from_ast_renders_source() {
        let node = ExprNode::from_ast(Expr::call("CONV", vec![Expr::NodeRef("x".into()), Expr::Array(vec![0.5, 0.5])]));
        assert_eq!(node.source(), "CONV(x, [0.5, 0.5])");
        assert_eq!(compile(node.source()).unwrap().ast(), node.ast());
    }
}
