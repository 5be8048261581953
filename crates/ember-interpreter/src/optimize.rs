//! Dead-prefix elision.
//!
//! `a; b` evaluates `a` only for its effects. When `a` cannot have any (and
//! cannot fail), the sequence is equivalent to `b` alone.

use ember_syntax::ast::Node;

use crate::config::InterpreterConfig;
use crate::interpreter::Program;
use crate::output::PrintHandler;

/// Rewrite every `Sequence(a, b)` with a dead `a` into `b`, recursively.
pub fn elide_dead_prefixes(node: &Node) -> Node {
    match node {
        Node::Sequence(first, second) => {
            let first = elide_dead_prefixes(first);
            let second = elide_dead_prefixes(second);
            if is_dead(&first) {
                second
            } else {
                Node::sequence(first, second)
            }
        }
        Node::Literal(_) | Node::NameRef(_) => node.clone(),
        Node::UnaryNegate(inner) => Node::UnaryNegate(boxed(inner)),
        Node::LogicalNot(inner) => Node::LogicalNot(boxed(inner)),
        Node::BinaryOp(op, lhs, rhs) => Node::BinaryOp(*op, boxed(lhs), boxed(rhs)),
        Node::Convert(ty, inner) => Node::Convert(*ty, boxed(inner)),
        Node::Assign { name, expr } => Node::Assign {
            name: name.clone(),
            expr: boxed(expr),
        },
        Node::Declare { ty, name, expr } => Node::Declare {
            ty: *ty,
            name: name.clone(),
            expr: boxed(expr),
        },
        Node::Block(inner) => Node::Block(boxed(inner)),
        Node::If {
            cond,
            then_branch,
            else_branch,
        } => Node::If {
            cond: boxed(cond),
            then_branch: boxed(then_branch),
            else_branch: else_branch.as_deref().map(|e| Box::new(elide_dead_prefixes(e))),
        },
        Node::While { cond, body } => Node::While {
            cond: boxed(cond),
            body: boxed(body),
        },
        Node::Call { name, args } => Node::Call {
            name: name.clone(),
            args: args.iter().map(elide_dead_prefixes).collect(),
        },
        Node::Print(inner) => Node::Print(boxed(inner)),
    }
}

fn boxed(node: &Node) -> Box<Node> {
    Box::new(elide_dead_prefixes(node))
}

/// Built only from effect-free nodes that never look anything up.
fn is_pure(node: &Node) -> bool {
    match node {
        Node::Literal(_) => true,
        Node::UnaryNegate(inner) | Node::Convert(_, inner) => is_pure(inner),
        Node::BinaryOp(_, lhs, rhs) => is_pure(lhs) && is_pure(rhs),
        _ => false,
    }
}

/// Pure, and evaluates without error (so `1 / 0; x` keeps its failure).
fn is_dead(node: &Node) -> bool {
    if !is_pure(node) {
        return false;
    }
    let config = InterpreterConfig::default().with_optimize(false);
    let mut scratch = Program::with_config(config, PrintHandler::Silent);
    scratch.evaluate_top_level(node).is_ok()
}
