//! Token definitions produced by the Ember lexer.
//!
//! Tokens are the smallest meaningful units of Ember source: literals,
//! identifiers, keywords, operators and punctuation. Each [`Token`] carries
//! the 1-based line and column where it starts so the parser can point at
//! the offending text when it reports an error.
//!
//! # Examples
//!
//! ```rust
//! use ember_syntax::{Token, TokenKind};
//!
//! let keyword = Token { kind: TokenKind::Def, line: 1, col: 1 };
//! let name = Token { kind: TokenKind::Ident("fact".to_string()), line: 1, col: 5 };
//! assert_eq!(keyword.kind.describe(), "'def'");
//! assert_eq!(name.kind.describe(), "identifier 'fact'");
//! ```

use crate::value::Type;

/// Token types that can be produced by the Ember lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Variable and function names: `x`, `fact`, `my_var`
    Ident(String),

    /// Integer literal without a decimal point: `42`
    Int(i64),

    /// Floating-point literal: `1.5`, `2.`, `.5`
    Float(f64),

    /// String literal with escapes already resolved
    Str(String),

    // === Keywords ===
    Def,
    If,
    Then,
    Else,
    While,
    Do,
    End,
    Not,
    Print,
    True,
    False,

    /// Type keyword in a declaration or signature: `int`, `float`, `str`, `bool`
    TypeName(Type),

    /// Conversion keyword: `toint`, `tofloat`, `tostr`, `tobool`
    Convert(Type),

    // === Punctuation ===
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    /// Return type marker `->` in function definitions
    Arrow,

    // === Operators ===
    /// Assignment `=`
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    EqEq,
    NotEq,
    Less,
    Greater,

    /// End-of-file marker
    Eof,
}

impl TokenKind {
    /// Human-readable rendering used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Int(n) => format!("number '{}'", n),
            TokenKind::Float(x) => format!("number '{}'", x),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::TypeName(ty) => format!("'{}'", ty.keyword()),
            TokenKind::Convert(ty) => format!("'to{}'", ty.keyword()),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Def => "def",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::End => "end",
            TokenKind::Not => "not",
            TokenKind::Print => "print",
            TokenKind::True => "True",
            TokenKind::False => "False",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Arrow => "->",
            TokenKind::Equal => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::TypeName(_)
            | TokenKind::Convert(_)
            | TokenKind::Eof => "",
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type and semantic content of this token
    pub kind: TokenKind,

    /// Line number in the source (1-based)
    pub line: usize,

    /// Column number in the source (1-based)
    pub col: usize,
}
