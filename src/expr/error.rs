//! Parse error types.
use thiserror::Error;

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that cannot start or continue the current construct.
    UnexpectedChar,
    /// Input ended while a construct was incomplete.
    UnexpectedEnd,
    /// A complete expression was followed by unconsumed characters.
    TrailingInput,
    /// A run of digits and dots that is not a number (e.g. `1.2.3`).
    InvalidNumber,
    /// Nesting exceeded the parser's depth limit.
    TooDeep,
}

/// Parse error with byte position and the full source text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at position {position} in expression '{source_text}'")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: usize,
    pub source_text: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: usize, source_text: &str) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            source_text: source_text.to_string(),
        }
    }
}
