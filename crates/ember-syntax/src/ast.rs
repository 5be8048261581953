//! AST (abstract syntax tree) types for the Ember language.
//!
//! Every construct is an expression; a program is a list of items, each
//! either a function definition or an expression evaluated for its value.

use std::fmt;

use crate::value::{Type, Value};

/// Binary operators, in source spelling order of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
        }
    }

    /// Comparison operators always produce `bool`.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression nodes. The tree is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Value),
    NameRef(String),
    UnaryNegate(Box<Node>),
    LogicalNot(Box<Node>),
    BinaryOp(BinOp, Box<Node>, Box<Node>),
    Convert(Type, Box<Node>),
    Assign {
        name: String,
        expr: Box<Node>,
    },
    Declare {
        ty: Type,
        name: String,
        expr: Box<Node>,
    },
    /// Evaluate the first node for effect, then yield the second.
    Sequence(Box<Node>, Box<Node>),
    Block(Box<Node>),
    If {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        cond: Box<Node>,
        body: Box<Node>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },
    Print(Box<Node>),
}

impl Node {
    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Literal(value.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Node::NameRef(name.into())
    }

    pub fn binary(op: BinOp, lhs: Node, rhs: Node) -> Self {
        Node::BinaryOp(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn sequence(first: Node, second: Node) -> Self {
        Node::Sequence(Box::new(first), Box::new(second))
    }

    pub fn declare(ty: Type, name: impl Into<String>, expr: Node) -> Self {
        Node::Declare {
            ty,
            name: name.into(),
            expr: Box::new(expr),
        }
    }

    pub fn assign(name: impl Into<String>, expr: Node) -> Self {
        Node::Assign {
            name: name.into(),
            expr: Box::new(expr),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args,
        }
    }
}

/// Function parameter: declared type and name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

impl Param {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Function definition as written in source.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Node,
}

/// Top-level items.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionDef),
    Expr(Node),
}

/// A parsed source text: the top-level items in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub items: Vec<Item>,
}
