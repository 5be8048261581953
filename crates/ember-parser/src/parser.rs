//! Recursive-descent parser with one function per precedence level.

use ember_syntax::ast::*;
use ember_syntax::error::{error_at, Result};
use ember_syntax::token::{Token, TokenKind};
use ember_syntax::value::{Type, Value};

/// Red zone / growth size for deeply nested input.
const RED_ZONE: usize = 64 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// `tokens` must end with `TokenKind::Eof`, as produced by the lexer.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let (line, col) = tokens.last().map_or((1, 1), |t| (t.line, t.col));
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse every top-level item until end of input.
    pub fn parse_program(&mut self) -> Result<Script> {
        let mut items = Vec::new();
        while !self.at(&TokenKind::Eof) {
            items.push(self.parse_item()?);
        }
        Ok(Script { items })
    }

    /// Parse one top-level item: a function definition or an expression.
    pub fn parse_item(&mut self) -> Result<Item> {
        if self.at(&TokenKind::Def) {
            self.parse_function().map(Item::Function)
        } else {
            self.parse_sequence().map(Item::Expr)
        }
    }

    /// Parse a full expression, including `;` sequences.
    pub fn parse_expr(&mut self) -> Result<Node> {
        self.parse_sequence()
    }

    fn parse_function(&mut self) -> Result<FunctionDef> {
        self.expect(TokenKind::Def, "'def'")?;
        let name = self.expect_ident()?;
        let mut params = Vec::new();
        while let TokenKind::TypeName(ty) = self.peek().kind {
            self.bump();
            let pname = self.expect_ident()?;
            params.push(Param::new(ty, pname));
        }
        self.expect(TokenKind::Arrow, "'->' before the return type")?;
        let return_type = self.expect_type()?;
        self.expect(TokenKind::Equal, "'=' before the function body")?;
        let body = self.parse_sequence()?;
        Ok(FunctionDef {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_sequence(&mut self) -> Result<Node> {
        let mut node = self.parse_single()?;
        while self.eat(&TokenKind::Semicolon) {
            let next = self.parse_single()?;
            node = Node::sequence(node, next);
        }
        Ok(node)
    }

    /// One expression without a trailing `;` chain.
    fn parse_single(&mut self) -> Result<Node> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || self.parse_single_inner())
    }

    fn parse_single_inner(&mut self) -> Result<Node> {
        match self.peek().kind.clone() {
            TokenKind::If => {
                self.bump();
                let cond = self.parse_single()?;
                self.expect(TokenKind::Then, "'then' after the condition")?;
                let then_branch = self.parse_sequence()?;
                let else_branch = if self.eat(&TokenKind::Else) {
                    Some(Box::new(self.parse_sequence()?))
                } else {
                    None
                };
                Ok(Node::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch,
                })
            }
            TokenKind::While => {
                self.bump();
                let cond = self.parse_single()?;
                self.expect(TokenKind::Do, "'do' after the loop condition")?;
                let body = self.parse_sequence()?;
                self.expect(TokenKind::End, "'end' to close the loop")?;
                Ok(Node::While {
                    cond: Box::new(cond),
                    body: Box::new(body),
                })
            }
            TokenKind::Print => {
                self.bump();
                let expr = self.parse_single()?;
                Ok(Node::Print(Box::new(expr)))
            }
            TokenKind::TypeName(ty) => {
                self.bump();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Equal, "'=' in declaration")?;
                let expr = self.parse_single()?;
                Ok(Node::declare(ty, name, expr))
            }
            TokenKind::Ident(name) if self.peek_at(1).kind == TokenKind::Equal => {
                self.bump();
                self.bump();
                let expr = self.parse_single()?;
                Ok(Node::assign(name, expr))
            }
            _ => self.parse_not(),
        }
    }

    fn parse_not(&mut self) -> Result<Node> {
        if self.eat(&TokenKind::Not) {
            let inner = self.parse_not()?;
            return Ok(Node::LogicalNot(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let mut lhs = self.parse_convert()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::Less => BinOp::Lt,
                TokenKind::Greater => BinOp::Gt,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.parse_convert()?;
            lhs = Node::binary(op, lhs, rhs);
        }
    }

    fn parse_convert(&mut self) -> Result<Node> {
        if let TokenKind::Convert(target) = self.peek().kind {
            self.bump();
            let inner = self.parse_convert()?;
            return Ok(Node::Convert(target, Box::new(inner)));
        }
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.parse_term()?;
            lhs = Node::binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Node::binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Node> {
        if self.eat(&TokenKind::Minus) {
            let inner = stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || self.parse_unary())?;
            return Ok(Node::UnaryNegate(Box::new(inner)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_primary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.parse_unary()?;
            return Ok(Node::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Int(n) => {
                self.bump();
                Ok(Node::Literal(Value::Int(n)))
            }
            TokenKind::Float(x) => {
                self.bump();
                Ok(Node::Literal(Value::Float(x)))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Node::Literal(Value::Str(s)))
            }
            TokenKind::True => {
                self.bump();
                Ok(Node::Literal(Value::Bool(true)))
            }
            TokenKind::False => {
                self.bump();
                Ok(Node::Literal(Value::Bool(false)))
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Node::call(name, args))
                } else {
                    Ok(Node::NameRef(name))
                }
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_sequence()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBrace => {
                self.bump();
                let inner = self.parse_sequence()?;
                self.expect(TokenKind::RBrace, "'}' to close the block")?;
                Ok(Node::Block(Box::new(inner)))
            }
            other => error_at(
                tok.line,
                tok.col,
                format!("Unexpected token {}", other.describe()),
            ),
        }
    }

    /// Arguments after the opening parenthesis, consuming the closing one.
    fn parse_call_args(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_single()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen, "',' or ')' in argument list")?;
            return Ok(args);
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            let tok = self.peek();
            error_at(
                tok.line,
                tok.col,
                format!("Expected {}, found {}", what, tok.kind.describe()),
            )
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            other => error_at(
                tok.line,
                tok.col,
                format!("Expected identifier, found {}", other.describe()),
            ),
        }
    }

    fn expect_type(&mut self) -> Result<Type> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::TypeName(ty) => {
                self.bump();
                Ok(ty)
            }
            other => error_at(
                tok.line,
                tok.col,
                format!("Expected type name, found {}", other.describe()),
            ),
        }
    }
}
