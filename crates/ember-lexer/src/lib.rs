//! Ember lexer: converts source text into tokens.
use ember_syntax::error::{error_at, Result, SyntaxError};
use ember_syntax::token::{Token, TokenKind};
use ember_syntax::value::Type;

/// Streaming character scanner that produces tokens with positions.
pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer over the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }
    fn peek_next(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }
    fn advance(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos).copied();
        if let Some(c) = ch {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                while let Some(c2) = self.peek() {
                    self.advance();
                    if c2 == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Reads `\d+`, `\d+\.\d*` or `\.\d+`. A literal with a decimal point is a float.
    fn read_number(&mut self) -> Result<Token> {
        let start_line = self.line;
        let start_col = self.col;
        let mut s = String::new();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else if c == '.' && !is_float {
                is_float = true;
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if is_float {
            // "2." and ".5" are both accepted; pad so the std parser agrees.
            let text = if s.ends_with('.') { format!("{}0", s) } else { s.clone() };
            let val: f64 = text
                .parse()
                .map_err(|_| SyntaxError::with_span(format!("Invalid number '{}'", s), start_line, start_col))?;
            TokenKind::Float(val)
        } else {
            let val: i64 = s
                .parse()
                .map_err(|_| SyntaxError::with_span(format!("Invalid number '{}'", s), start_line, start_col))?;
            TokenKind::Int(val)
        };
        Ok(Token {
            kind,
            line: start_line,
            col: start_col,
        })
    }

    fn read_ident_or_keyword(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match s.as_str() {
            "def" => TokenKind::Def,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "end" => TokenKind::End,
            "not" => TokenKind::Not,
            "print" => TokenKind::Print,
            "True" => TokenKind::True,
            "False" => TokenKind::False,
            "int" => TokenKind::TypeName(Type::Int),
            "float" => TokenKind::TypeName(Type::Float),
            "str" => TokenKind::TypeName(Type::Str),
            "bool" => TokenKind::TypeName(Type::Bool),
            "toint" => TokenKind::Convert(Type::Int),
            "tofloat" => TokenKind::Convert(Type::Float),
            "tostr" => TokenKind::Convert(Type::Str),
            "tobool" => TokenKind::Convert(Type::Bool),
            _ => TokenKind::Ident(s),
        };
        Token {
            kind,
            line: start_line,
            col: start_col,
        }
    }

    fn read_string(&mut self, start_line: usize, start_col: usize) -> Result<Token> {
        let mut s = String::new();
        while let Some(c) = self.advance() {
            match c {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::Str(s),
                        line: start_line,
                        col: start_col,
                    });
                }
                '\\' => {
                    if let Some(n) = self.advance() {
                        let esc = match n {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            '\\' => '\\',
                            '"' => '"',
                            other => other,
                        };
                        s.push(esc);
                    } else {
                        return error_at(start_line, start_col, "Unterminated string");
                    }
                }
                other => s.push(other),
            }
        }
        error_at(start_line, start_col, "Unterminated string")
    }

    /// Tokenize the entire input into a vector of tokens ending with Eof.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let line = self.line;
            let col = self.col;
            let single = |kind: TokenKind| Token { kind, line, col };
            let tk = match self.peek() {
                None => {
                    tokens.push(single(TokenKind::Eof));
                    break;
                }
                Some(c) if c.is_ascii_digit() => self.read_number()?,
                Some('.') if self.peek_next().map_or(false, |n| n.is_ascii_digit()) => self.read_number()?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.read_ident_or_keyword(),
                Some('"') => {
                    self.advance();
                    self.read_string(line, col)?
                }
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        single(TokenKind::EqEq)
                    } else {
                        single(TokenKind::Equal)
                    }
                }
                Some('!') => {
                    if self.peek_next() == Some('=') {
                        self.advance();
                        self.advance();
                        single(TokenKind::NotEq)
                    } else {
                        return error_at(line, col, "Unexpected '!' (did you mean '!=' or 'not'?)");
                    }
                }
                Some('-') => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        single(TokenKind::Arrow)
                    } else {
                        single(TokenKind::Minus)
                    }
                }
                Some(c) => {
                    let kind = match c {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        ',' => TokenKind::Comma,
                        ';' => TokenKind::Semicolon,
                        '+' => TokenKind::Plus,
                        '*' => TokenKind::Star,
                        '/' => TokenKind::Slash,
                        '^' => TokenKind::Caret,
                        '<' => TokenKind::Less,
                        '>' => TokenKind::Greater,
                        other => {
                            return error_at(line, col, format!("Unexpected character '{}'", other));
                        }
                    };
                    self.advance();
                    single(kind)
                }
            };
            tokens.push(tk);
        }
        Ok(tokens)
    }
}
