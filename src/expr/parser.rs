//! Hand-written recursive-descent parser.
//!
//! ```text
//! Expression := Term (('+' | '-') Term)*
//! Term       := Factor (('*' | '/') Factor)*
//! Factor     := Number | Array | Identifier | Identifier '(' Args? ')' | '(' Expression ')'
//! Args       := Expression (',' Expression)*
//! Array      := '[' (Number (',' Number)*)? ']'
//! ```
//!
//! Parsing is all-or-nothing: the whole input must be consumed.
//!
//! Every parenthesis, call and binary fold counts toward [`MAX_DEPTH`], which
//! bounds the depth of the resulting tree.

use super::ast::Expr;
use super::error::{ParseError, ParseErrorKind};
use crate::graph::{BinaryOperator, NodeId};

pub const MAX_DEPTH: usize = 256;

pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expression()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error(
            ParseErrorKind::TrailingInput,
            format!("unexpected '{}' after end of expression", parser.current_char()),
        ));
    }
    Ok(expr)
}

pub struct Parser<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, depth: 0 }
    }

    fn at_end(&self) -> bool { self.pos >= self.bytes.len() }

    fn peek(&self) -> Option<u8> { self.bytes.get(self.pos).copied() }

    fn current_char(&self) -> char {
        self.src[self.pos..].chars().next().unwrap_or('\0')
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.pos, self.src)
    }

    fn unexpected(&self, context: &str) -> ParseError {
        if self.at_end() {
            self.error(ParseErrorKind::UnexpectedEnd, format!("unexpected end of input, expected {}", context))
        } else {
            self.error(
                ParseErrorKind::UnexpectedChar,
                format!("unexpected '{}', expected {}", self.current_char(), context),
            )
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(
                ParseErrorKind::TooDeep,
                format!("expression nests deeper than {} levels", MAX_DEPTH),
            ));
        }
        Ok(())
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", byte as char)))
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.parse_term()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(b'+') => BinaryOperator::Add,
                Some(b'-') => BinaryOperator::Sub,
                _ => {
                    self.depth = base;
                    return Ok(lhs);
                }
            };
            self.pos += 1;
            self.descend()?;
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.parse_factor()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(b'*') => BinaryOperator::Mul,
                Some(b'/') => BinaryOperator::Div,
                _ => {
                    self.depth = base;
                    return Ok(lhs);
                }
            };
            self.pos += 1;
            self.descend()?;
            let rhs = self.parse_factor()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                self.descend()?;
                let inner = self.parse_expression()?;
                self.expect(b')')?;
                self.depth -= 1;
                Ok(inner)
            }
            Some(b'[') => self.parse_array(),
            Some(b) if b.is_ascii_digit() || b == b'.' => Ok(Expr::Literal(self.parse_number()?)),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.parse_identifier(),
            _ => Err(self.unexpected("a number, identifier, '[' or '('")),
        }
    }

    /// Digits with at most one decimal point; no sign, exponent, or grouping.
    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.') {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        if text.is_empty() {
            return Err(self.unexpected("a number"));
        }
        let dots = text.bytes().filter(|&b| b == b'.').count();
        if dots > 1 || text == "." {
            return Err(ParseError::new(
                ParseErrorKind::InvalidNumber,
                format!("invalid number '{}'", text),
                start,
                self.src,
            ));
        }
        text.parse::<f64>().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidNumber, format!("invalid number '{}'", text), start, self.src)
        })
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        self.expect(b'[')?;
        let mut values = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Expr::Array(values));
        }
        loop {
            values.push(self.parse_number()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Expr::Array(values));
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    fn parse_identifier(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        let name = &self.src[start..self.pos];

        // A call only when '(' follows immediately.
        if self.peek() != Some(b'(') {
            return Ok(Expr::NodeRef(NodeId::new(name)));
        }
        self.pos += 1;
        self.descend()?;

        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b')') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Expr::call(name, args));
        }
        loop {
            args.push(self.parse_expression()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    self.depth -= 1;
                    return Ok(Expr::call(name, args));
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }
}
