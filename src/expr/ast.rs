//! Expression syntax tree.

use crate::graph::{BinaryOperator, NodeId};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    NodeRef(NodeId),
    /// Numeric-literal array; only meaningful as a `CONV` kernel.
    Array(Vec<f64>),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Function name is kept as written; dispatch is case-insensitive.
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call { name: name.into(), args }
    }

    /// Visits every node reference, depth first, left to right.
    pub fn visit_refs(&self, f: &mut impl FnMut(&NodeId)) {
        match self {
            Expr::Literal(_) | Expr::Array(_) => {}
            Expr::NodeRef(id) => f(id),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit_refs(f);
                rhs.visit_refs(f);
            }
            Expr::Call { args, .. } => {
                for a in args {
                    a.visit_refs(f);
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::NodeRef(id) => write!(f, "{}", id),
            Expr::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                f.write_str(")")
            }
        }
    }
}
