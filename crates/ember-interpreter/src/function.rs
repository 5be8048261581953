//! User-defined functions and the append-only registry that holds them.

use std::collections::HashMap;
use std::rc::Rc;

use ember_syntax::ast::{Node, Param};
use ember_syntax::value::Type;

use crate::error::{InterpreterError, Result};
use crate::scope::ScopeId;

/// A registered function. The body is shared by every invocation.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Rc<Node>,
    /// Parent of every invocation scope
    pub defining_scope: ScopeId,
}

impl Function {
    /// Source-like signature, e.g. `def fact int n -> int`.
    pub fn signature(&self) -> String {
        let mut sig = format!("def {}", self.name);
        for p in &self.params {
            sig.push_str(&format!(" {} {}", p.ty, p.name));
        }
        sig.push_str(&format!(" -> {}", self.return_type));
        sig
    }
}

/// Global function table. Entries are never replaced or removed, and lookups
/// ignore scoping: a function is callable everywhere once defined.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Rc<Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, function: Function) -> Result<()> {
        if self.functions.contains_key(&function.name) {
            return Err(InterpreterError::DuplicateFunction {
                name: function.name,
            });
        }
        self.functions
            .insert(function.name.clone(), Rc::new(function));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Rc<Function>> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| InterpreterError::UndefinedFunction {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut v: Vec<String> = self.functions.keys().cloned().collect();
        v.sort();
        v
    }

    /// Functions sorted by name.
    pub fn functions(&self) -> Vec<Rc<Function>> {
        let mut v: Vec<Rc<Function>> = self.functions.values().cloned().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }
}
