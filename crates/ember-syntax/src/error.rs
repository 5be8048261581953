//! Syntax errors shared by the lexer and the parser.
//!
//! Runtime failures live in `ember-interpreter`; this module only covers the
//! text-to-AST stages, where a precise source location is usually known.
//!
//! # Examples
//!
//! ```rust
//! use ember_syntax::error::{error_at, Result, SyntaxError};
//!
//! fn expect_digit(c: char, line: usize, col: usize) -> Result<u32> {
//!     c.to_digit(10)
//!         .map(Ok)
//!         .unwrap_or_else(|| error_at(line, col, format!("Expected digit, got '{}'", c)))
//! }
//!
//! let err = expect_digit('x', 3, 7).unwrap_err();
//! assert_eq!(err.to_string(), "Expected digit, got 'x' at 3:7");
//! assert_eq!(SyntaxError::new("oops").to_string(), "oops");
//! ```

use std::fmt;

/// An error found while lexing or parsing.
///
/// `line` and `col` are 1-based and present whenever the failure can be
/// attributed to a token or character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub msg: String,

    /// Line number in the source (1-based)
    pub line: Option<usize>,

    /// Column number in the source (1-based)
    pub col: Option<usize>,
}

impl SyntaxError {
    /// Creates an error without location information.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// Creates an error pointing at `line`:`col`.
    pub fn with_span(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(l), Some(c)) = (self.line, self.col) {
            write!(f, "{} at {}:{}", self.msg, l, c)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Result alias for the lexer and parser.
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Shorthand for `Err(SyntaxError::new(msg))`.
pub fn error<T>(msg: impl Into<String>) -> Result<T> {
    Err(SyntaxError::new(msg))
}

/// Shorthand for `Err(SyntaxError::with_span(msg, line, col))`.
pub fn error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(SyntaxError::with_span(msg, line, col))
}
