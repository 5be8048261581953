//! The evaluator and the program context it runs in.

use std::collections::HashSet;
use std::rc::Rc;

use ember_syntax::ast::{Item, Node, Param, Script};
use ember_syntax::value::{Type, Value};
use tracing::{debug, trace};

use crate::checker;
use crate::config::InterpreterConfig;
use crate::error::{InterpreterError, Result};
use crate::function::{Function, FunctionRegistry};
use crate::ops;
use crate::optimize;
use crate::output::PrintHandler;
use crate::scope::{Binding, ScopeId, Scopes};
use crate::stack::ensure_sufficient_stack;

/// One running program: a root scope, a function registry and an output sink.
///
/// State persists across [`evaluate_top_level`](Program::evaluate_top_level)
/// calls, so a REPL feeds every statement to the same `Program`. Independent
/// programs use independent `Program` values; nothing is process-global.
#[derive(Debug)]
pub struct Program {
    scopes: Scopes,
    functions: FunctionRegistry,
    output: PrintHandler,
    config: InterpreterConfig,
    /// Number of function invocations currently on the stack
    depth: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// A program printing to stdout with the default configuration.
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default(), PrintHandler::Stdout)
    }

    pub fn with_config(config: InterpreterConfig, output: PrintHandler) -> Self {
        Self {
            scopes: Scopes::new(),
            functions: FunctionRegistry::new(),
            output,
            config,
            depth: 0,
        }
    }

    /// Output captured by a [`PrintHandler::Buffer`] sink.
    pub fn output(&self) -> &str {
        self.output.captured()
    }

    /// Forget every variable, function and captured line. Configuration and
    /// the kind of sink are kept.
    pub fn reset(&mut self) {
        self.scopes = Scopes::new();
        self.functions = FunctionRegistry::new();
        self.output.clear();
        self.depth = 0;
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.names()
    }

    /// Bindings of the global scope, sorted by name.
    pub fn globals(&self) -> Vec<(String, Binding)> {
        self.scopes.bindings(ScopeId::ROOT)
    }

    /// Static type of `node` in the global scope.
    pub fn resolve_type(&self, node: &Node) -> Result<Type> {
        checker::resolve_type(&self.scopes, &self.functions, ScopeId::ROOT, node)
    }

    /// Run every item of a parsed script in order and return the last value.
    pub fn run(&mut self, script: &Script) -> Result<Value> {
        let mut last = Value::Unit;
        for item in &script.items {
            last = self.run_item(item)?;
        }
        Ok(last)
    }

    /// Run one item: register a function definition, or evaluate a statement.
    pub fn run_item(&mut self, item: &Item) -> Result<Value> {
        match item {
            Item::Function(def) => {
                self.define_function(
                    def.name.clone(),
                    def.params.clone(),
                    def.return_type,
                    def.body.clone(),
                )?;
                Ok(Value::Unit)
            }
            Item::Expr(node) => self.evaluate_top_level(node),
        }
    }

    /// Evaluate one top-level statement against the global scope.
    ///
    /// On error, effects of sub-expressions that already ran are kept.
    pub fn evaluate_top_level(&mut self, node: &Node) -> Result<Value> {
        trace!(?node, "top-level statement");
        let result = if self.config.optimize {
            let node = optimize::elide_dead_prefixes(node);
            self.eval(&node, ScopeId::ROOT)
        } else {
            self.eval(node, ScopeId::ROOT)
        };
        if result.is_err() {
            self.scopes.unwind();
            self.depth = 0;
        }
        result
    }

    /// Register a function whose invocation scopes hang off the global scope.
    pub fn define_function(
        &mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: Type,
        body: Node,
    ) -> Result<()> {
        let name = name.into();
        if let Some(dup) = duplicate_param(&params) {
            return Err(InterpreterError::Redeclaration { name: dup });
        }
        if self.functions.contains(&name) {
            return Err(InterpreterError::DuplicateFunction { name });
        }
        let body = if self.config.optimize {
            optimize::elide_dead_prefixes(&body)
        } else {
            body
        };
        debug!(function = %name, params = params.len(), ret = %return_type, "define function");
        self.functions.define(Function {
            name,
            params,
            return_type,
            body: Rc::new(body),
            defining_scope: ScopeId::ROOT,
        })
    }

    fn resolve(&self, node: &Node, scope: ScopeId) -> Result<Type> {
        checker::resolve_type(&self.scopes, &self.functions, scope, node)
    }

    /// Run `f` in a fresh child of `parent`; the child is discarded afterwards,
    /// whether `f` succeeded or not.
    fn in_child<T>(
        &mut self,
        parent: ScopeId,
        f: impl FnOnce(&mut Self, ScopeId) -> Result<T>,
    ) -> Result<T> {
        let child = self.scopes.push(parent);
        let result = f(self, child);
        self.scopes.discard(child);
        result
    }

    fn eval(&mut self, node: &Node, scope: ScopeId) -> Result<Value> {
        ensure_sufficient_stack(|| self.eval_node(node, scope))
    }

    fn eval_node(&mut self, node: &Node, scope: ScopeId) -> Result<Value> {
        match node {
            Node::Literal(v) => Ok(v.clone()),
            Node::NameRef(name) => self.scopes.lookup_value(scope, name),
            Node::UnaryNegate(inner) => {
                self.resolve(node, scope)?;
                let v = self.eval(inner, scope)?;
                ops::negate(v)
            }
            Node::LogicalNot(inner) => {
                let v = self.eval(inner, scope)?;
                Ok(Value::Bool(!ops::truthy(&v, "not")?))
            }
            Node::BinaryOp(op, lhs, rhs) => {
                self.resolve(node, scope)?;
                let lhs = self.eval(lhs, scope)?;
                let rhs = self.eval(rhs, scope)?;
                ops::apply_binary(*op, lhs, rhs)
            }
            Node::Convert(target, inner) => {
                let v = self.eval(inner, scope)?;
                ops::convert(v, *target)
            }
            Node::Assign { name, expr } => {
                let expected = self.scopes.lookup_type(scope, name)?;
                self.check_static(name, expected, expr, scope)?;
                let v = self.eval(expr, scope)?;
                self.scopes.assign(scope, name, v)
            }
            Node::Declare { ty, name, expr } => {
                self.check_static(name, *ty, expr, scope)?;
                let v = self.eval(expr, scope)?;
                self.scopes.declare(scope, name, *ty, v)
            }
            Node::Sequence(first, second) => {
                self.eval(first, scope)?;
                self.eval(second, scope)
            }
            Node::Block(inner) => self.in_child(scope, |p, child| p.eval(inner, child)),
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => {
                // Typed before either branch runs, so names the taken branch
                // declares cannot change the answer.
                let widen = self.resolve(node, scope) == Ok(Type::Float);
                self.in_child(scope, |p, child| {
                    p.require_bool(cond, child, "if")?;
                    let c = p.eval(cond, child)?;
                    let taken = if ops::truthy(&c, "if")? {
                        Some(&**then_branch)
                    } else {
                        else_branch.as_deref()
                    };
                    match taken {
                        Some(branch) => match p.eval(branch, child)? {
                            Value::Int(n) if widen => Ok(Value::Float(n as f64)),
                            v => Ok(v),
                        },
                        None => Ok(Value::Unit),
                    }
                })
            }
            Node::While { cond, body } => self.in_child(scope, |p, child| {
                p.require_bool(cond, child, "while")?;
                let mut last = Value::Unit;
                loop {
                    let c = p.eval(cond, child)?;
                    if !ops::truthy(&c, "while")? {
                        break;
                    }
                    last = p.eval(body, child)?;
                }
                Ok(last)
            }),
            Node::Call { name, args } => self.call(name, args, scope),
            Node::Print(inner) => {
                let v = self.eval(inner, scope)?;
                self.output.println(&v.to_string());
                Ok(v)
            }
        }
    }

    fn check_static(&self, name: &str, expected: Type, expr: &Node, scope: ScopeId) -> Result<()> {
        let found = self.resolve(expr, scope)?;
        if found != expected {
            return Err(InterpreterError::TypeMismatch {
                name: name.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    fn require_bool(&self, cond: &Node, scope: ScopeId, construct: &str) -> Result<()> {
        match self.resolve(cond, scope)? {
            Type::Bool => Ok(()),
            other => Err(InterpreterError::type_error(format!(
                "{} condition must be bool, got {}",
                construct, other
            ))),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, args, scope), fields(depth = self.depth))]
    fn call(&mut self, name: &str, args: &[Node], scope: ScopeId) -> Result<Value> {
        let function = self.functions.get(name)?;
        if args.len() != function.params.len() {
            return Err(InterpreterError::Arity {
                name: name.to_string(),
                expected: function.params.len(),
                found: args.len(),
            });
        }

        // Arguments run in the caller's scope, one at a time; a failure keeps
        // the effects of the arguments before it.
        let mut values = Vec::with_capacity(args.len());
        for (i, (arg, param)) in args.iter().zip(&function.params).enumerate() {
            let v = self.eval(arg, scope)?;
            let v = ops::coerce(v, param.ty).map_err(|v| InterpreterError::ArgumentType {
                function: name.to_string(),
                position: i + 1,
                expected: param.ty,
                found: v.ty(),
            })?;
            values.push(v);
        }

        if self.depth >= self.config.max_call_depth {
            return Err(InterpreterError::RecursionLimit {
                function: name.to_string(),
                limit: self.config.max_call_depth,
            });
        }
        self.depth += 1;
        let result = self.in_child(function.defining_scope, |p, invocation| {
            for (param, v) in function.params.iter().zip(values) {
                p.scopes.declare(invocation, &param.name, param.ty, v)?;
            }
            p.eval(&function.body, invocation)
        });
        self.depth -= 1;

        ops::coerce(result?, function.return_type).map_err(|v| InterpreterError::TypeMismatch {
            name: name.to_string(),
            expected: function.return_type,
            found: v.ty(),
        })
    }
}

/// First parameter name that appears twice in one definition.
fn duplicate_param(params: &[Param]) -> Option<String> {
    let mut seen = HashSet::new();
    params
        .iter()
        .find(|p| !seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
}
