//! Static type resolution.
//!
//! [`resolve_type`] computes the type a node would evaluate to without
//! evaluating anything. Declarations made inside the node itself (earlier in a
//! sequence, inside a block or branch) have not reached the real scopes yet, so
//! the checker records them in a stack of scratch frames that shadow the scope
//! chain for the duration of one resolution.

use std::collections::HashMap;

use ember_syntax::ast::Node;
use ember_syntax::value::Type;

use crate::error::{InterpreterError, Result};
use crate::function::FunctionRegistry;
use crate::ops;
use crate::scope::{ScopeId, Scopes};

/// Static type of `node` as seen from `scope`.
pub fn resolve_type(
    scopes: &Scopes,
    functions: &FunctionRegistry,
    scope: ScopeId,
    node: &Node,
) -> Result<Type> {
    let mut checker = Checker {
        scopes,
        functions,
        scope,
        overlay: vec![HashMap::new()],
    };
    checker.resolve(node)
}

struct Checker<'a> {
    scopes: &'a Scopes,
    functions: &'a FunctionRegistry,
    scope: ScopeId,
    /// Innermost frame last
    overlay: Vec<HashMap<String, Type>>,
}

impl Checker<'_> {
    fn lookup(&self, name: &str) -> Result<Type> {
        for frame in self.overlay.iter().rev() {
            if let Some(ty) = frame.get(name) {
                return Ok(*ty);
            }
        }
        self.scopes.lookup_type(self.scope, name)
    }

    fn framed(&mut self, f: impl FnOnce(&mut Self) -> Result<Type>) -> Result<Type> {
        self.overlay.push(HashMap::new());
        let result = f(self);
        self.overlay.pop();
        result
    }

    fn resolve(&mut self, node: &Node) -> Result<Type> {
        match node {
            Node::Literal(v) => Ok(v.ty()),
            Node::NameRef(name) => self.lookup(name),
            Node::UnaryNegate(inner) => {
                let ty = self.resolve(inner)?;
                if ty.is_numeric() {
                    Ok(ty)
                } else {
                    Err(InterpreterError::type_error(format!(
                        "only numbers can be negated, got {}",
                        ty
                    )))
                }
            }
            Node::LogicalNot(inner) => {
                self.resolve(inner)?;
                Ok(Type::Bool)
            }
            Node::BinaryOp(op, lhs, rhs) => {
                let lhs = self.resolve(lhs)?;
                let rhs = self.resolve(rhs)?;
                ops::binary_result_type(*op, lhs, rhs)
            }
            Node::Convert(target, inner) => {
                self.resolve(inner)?;
                Ok(*target)
            }
            Node::Assign { expr, .. } => self.resolve(expr),
            Node::Declare { ty, name, expr } => {
                let found = self.resolve(expr)?;
                if let Some(frame) = self.overlay.last_mut() {
                    frame.insert(name.clone(), *ty);
                }
                Ok(found)
            }
            Node::Sequence(first, second) => {
                self.resolve(first)?;
                self.resolve(second)
            }
            Node::Block(inner) => self.framed(|c| c.resolve(inner)),
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => self.framed(|c| {
                c.resolve(cond)?;
                let then_ty = c.framed(|c| c.resolve(then_branch))?;
                let else_ty = match else_branch {
                    Some(branch) => c.framed(|c| c.resolve(branch))?,
                    None => Type::Unit,
                };
                Ok(join(then_ty, else_ty))
            }),
            Node::While { cond, body } => self.framed(|c| {
                c.resolve(cond)?;
                c.resolve(body)
            }),
            Node::Call { name, args } => {
                let function = self.functions.get(name)?;
                for arg in args {
                    self.resolve(arg)?;
                }
                Ok(function.return_type)
            }
            Node::Print(inner) => self.resolve(inner),
        }
    }
}

/// Common type of two branches: equal types join to themselves, mixed numerics
/// widen to float, anything else is unknown.
pub fn join(a: Type, b: Type) -> Type {
    if a == b {
        a
    } else if a.is_numeric() && b.is_numeric() {
        Type::Float
    } else {
        Type::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_syntax::ast::BinOp;
    use ember_syntax::value::Value;

    fn resolve(node: &Node) -> Result<Type> {
        resolve_type(&Scopes::new(), &FunctionRegistry::new(), ScopeId::ROOT, node)
    }

    #[test]
    fn literals_and_operators() {
        assert_eq!(resolve(&Node::literal(1)).unwrap(), Type::Int);
        assert_eq!(resolve(&Node::literal(1.0)).unwrap(), Type::Float);
        let div = Node::binary(BinOp::Div, Node::literal(4), Node::literal(2));
        assert_eq!(resolve(&div).unwrap(), Type::Float);
        let rep = Node::binary(BinOp::Mul, Node::literal(3), Node::literal("a"));
        assert_eq!(resolve(&rep).unwrap(), Type::Str);
    }

    #[test]
    fn negation_requires_numbers() {
        let neg = Node::UnaryNegate(Box::new(Node::literal("x")));
        assert_eq!(resolve(&neg).unwrap_err().kind(), "TypeError");
    }

    #[test]
    fn earlier_declarations_are_visible() {
        let node = Node::Block(Box::new(Node::sequence(
            Node::declare(Type::Int, "a", Node::literal(1)),
            Node::binary(BinOp::Add, Node::name("a"), Node::literal(1)),
        )));
        assert_eq!(resolve(&node).unwrap(), Type::Int);
        assert_eq!(resolve(&Node::name("a")).unwrap_err().kind(), "UndefinedNameError");
    }

    #[test]
    fn block_declarations_do_not_leak() {
        let node = Node::sequence(
            Node::Block(Box::new(Node::declare(Type::Int, "a", Node::literal(1)))),
            Node::name("a"),
        );
        assert_eq!(resolve(&node).unwrap_err().kind(), "UndefinedNameError");
    }

    #[test]
    fn if_joins_branch_types() {
        let mixed = Node::If {
            cond: Box::new(Node::literal(true)),
            then_branch: Box::new(Node::literal(1)),
            else_branch: Some(Box::new(Node::literal(2.5))),
        };
        assert_eq!(resolve(&mixed).unwrap(), Type::Float);
        let unknown = Node::If {
            cond: Box::new(Node::literal(true)),
            then_branch: Box::new(Node::literal(1)),
            else_branch: Some(Box::new(Node::literal("one"))),
        };
        assert_eq!(resolve(&unknown).unwrap(), Type::Unknown);
        let no_else = Node::If {
            cond: Box::new(Node::literal(true)),
            then_branch: Box::new(Node::literal(1)),
            else_branch: None,
        };
        assert_eq!(resolve(&no_else).unwrap(), Type::Unknown);
    }

    #[test]
    fn names_come_from_scope() {
        let mut scopes = Scopes::new();
        scopes
            .declare(ScopeId::ROOT, "s", Type::Str, Value::from("x"))
            .unwrap();
        let node = Node::binary(BinOp::Add, Node::name("s"), Node::literal(1));
        let err = resolve_type(&scopes, &FunctionRegistry::new(), ScopeId::ROOT, &node).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedOperandError");
    }

    #[test]
    fn calls_use_declared_return_type() {
        let call = Node::call("missing", vec![]);
        assert_eq!(resolve(&call).unwrap_err().kind(), "UndefinedFunctionError");
    }
}
