//! The embedded expression language: parser, AST, compiler and evaluator.
pub mod ast;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::Expr;
pub use compiler::{compile, ExprNode};
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
