//! Lexical scopes for the Ember interpreter.
//!
//! Scopes live in an arena owned by the [`Program`](crate::Program) and are
//! addressed by [`ScopeId`]. Each scope points at the parent it delegates
//! lookups to; the parent is never owned by the child. Scopes are created and
//! discarded strictly innermost-first, so the arena behaves like a stack: a
//! block, branch, loop or call pushes a scope and discards it when done, and
//! nothing declared inside survives.

use std::collections::HashMap;

use ember_syntax::value::{Type, Value};
use tracing::trace;

use crate::error::{InterpreterError, Result};

/// Handle to a live scope in a [`Scopes`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The global scope, alive for the whole program run.
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Declared type; the value always has this runtime type
    pub ty: Type,
    /// Current value of the binding
    pub value: Value,
}

#[derive(Debug, Default)]
struct Scope {
    /// Names declared directly in this scope
    vars: HashMap<String, Binding>,
    /// Scope that lookups fall back to (None for the root)
    parent: Option<ScopeId>,
}

#[derive(Debug)]
pub struct Scopes {
    scopes: Vec<Scope>,
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    /// An arena holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of live scopes, the root included.
    pub fn live(&self) -> usize {
        self.scopes.len()
    }

    /// Open a new scope whose lookups fall back to `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        trace!(scope = id.0, parent = parent.0, "push scope");
        self.scopes.push(Scope {
            vars: HashMap::new(),
            parent: Some(parent),
        });
        id
    }

    /// Drop `id`, which must be the innermost live scope. The root is never dropped.
    pub fn discard(&mut self, id: ScopeId) {
        if id == ScopeId::ROOT {
            return;
        }
        debug_assert_eq!(id.0 + 1, self.scopes.len(), "scopes must be discarded innermost-first");
        trace!(scope = id.0, "discard scope");
        self.scopes.truncate(id.0);
    }

    /// Drop every scope except the root.
    pub fn unwind(&mut self) {
        self.scopes.truncate(1);
    }

    /// Bind a new name in `scope`. Shadowing a parent binding is fine; a second
    /// declaration in the same scope is not.
    pub fn declare(&mut self, scope: ScopeId, name: &str, ty: Type, value: Value) -> Result<Value> {
        if value.ty() != ty {
            return Err(InterpreterError::TypeMismatch {
                name: name.to_string(),
                expected: ty,
                found: value.ty(),
            });
        }
        let vars = &mut self.scopes[scope.0].vars;
        if vars.contains_key(name) {
            return Err(InterpreterError::Redeclaration {
                name: name.to_string(),
            });
        }
        vars.insert(
            name.to_string(),
            Binding {
                ty,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Update the nearest binding of `name`, wherever it lives in the chain.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<Value> {
        let owner = self.find(scope, name).ok_or_else(|| undefined(name))?;
        let binding = self.scopes[owner.0]
            .vars
            .get_mut(name)
            .ok_or_else(|| undefined(name))?;
        if binding.ty != value.ty() {
            return Err(InterpreterError::TypeMismatch {
                name: name.to_string(),
                expected: binding.ty,
                found: value.ty(),
            });
        }
        binding.value = value.clone();
        Ok(value)
    }

    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Result<Type> {
        self.binding(scope, name).map(|b| b.ty)
    }

    pub fn lookup_value(&self, scope: ScopeId, name: &str) -> Result<Value> {
        self.binding(scope, name).map(|b| b.value.clone())
    }

    pub fn binding(&self, scope: ScopeId, name: &str) -> Result<&Binding> {
        self.find(scope, name)
            .and_then(|owner| self.scopes[owner.0].vars.get(name))
            .ok_or_else(|| undefined(name))
    }

    /// Bindings declared directly in `scope`, sorted by name.
    pub fn bindings(&self, scope: ScopeId) -> Vec<(String, Binding)> {
        let mut vars: Vec<(String, Binding)> = self.scopes[scope.0]
            .vars
            .iter()
            .map(|(k, b)| (k.clone(), b.clone()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    fn find(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0];
            if s.vars.contains_key(name) {
                return Some(id);
            }
            current = s.parent;
        }
        None
    }
}

fn undefined(name: &str) -> InterpreterError {
    InterpreterError::UndefinedName {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let mut scopes = Scopes::new();
        let v = scopes.declare(ScopeId::ROOT, "x", Type::Int, Value::Int(5)).unwrap();
        assert_eq!(v, Value::Int(5));
        assert_eq!(scopes.lookup_type(ScopeId::ROOT, "x").unwrap(), Type::Int);
        assert_eq!(scopes.lookup_value(ScopeId::ROOT, "x").unwrap(), Value::Int(5));
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut scopes = Scopes::new();
        scopes.declare(ScopeId::ROOT, "x", Type::Int, Value::Int(1)).unwrap();
        let err = scopes
            .declare(ScopeId::ROOT, "x", Type::Int, Value::Int(2))
            .unwrap_err();
        assert_eq!(err, InterpreterError::Redeclaration { name: "x".into() });
    }

    #[test]
    fn shadowing_is_undone_on_discard() {
        let mut scopes = Scopes::new();
        scopes.declare(ScopeId::ROOT, "x", Type::Int, Value::Int(1)).unwrap();
        let child = scopes.push(ScopeId::ROOT);
        scopes.declare(child, "x", Type::Str, Value::from("inner")).unwrap();
        assert_eq!(scopes.lookup_value(child, "x").unwrap(), Value::from("inner"));
        scopes.discard(child);
        assert_eq!(scopes.live(), 1);
        assert_eq!(scopes.lookup_value(ScopeId::ROOT, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn assign_reaches_ancestor() {
        let mut scopes = Scopes::new();
        scopes.declare(ScopeId::ROOT, "x", Type::Int, Value::Int(1)).unwrap();
        let child = scopes.push(ScopeId::ROOT);
        let grandchild = scopes.push(child);
        scopes.assign(grandchild, "x", Value::Int(7)).unwrap();
        assert!(scopes.bindings(grandchild).is_empty());
        scopes.discard(grandchild);
        scopes.discard(child);
        assert_eq!(scopes.lookup_value(ScopeId::ROOT, "x").unwrap(), Value::Int(7));
    }

    #[test]
    fn assign_errors() {
        let mut scopes = Scopes::new();
        assert_eq!(
            scopes.assign(ScopeId::ROOT, "nope", Value::Int(1)).unwrap_err().kind(),
            "UndefinedNameError"
        );
        scopes.declare(ScopeId::ROOT, "x", Type::Int, Value::Int(1)).unwrap();
        let err = scopes.assign(ScopeId::ROOT, "x", Value::from("hi")).unwrap_err();
        assert_eq!(
            err,
            InterpreterError::TypeMismatch {
                name: "x".into(),
                expected: Type::Int,
                found: Type::Str,
            }
        );
        assert_eq!(scopes.lookup_value(ScopeId::ROOT, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn declare_checks_value_type() {
        let mut scopes = Scopes::new();
        let err = scopes
            .declare(ScopeId::ROOT, "f", Type::Float, Value::Int(1))
            .unwrap_err();
        assert_eq!(err.kind(), "TypeMismatchError");
        assert!(scopes.lookup_type(ScopeId::ROOT, "f").is_err());
    }

    #[test]
    fn sibling_scope_cannot_see_discarded_names() {
        let mut scopes = Scopes::new();
        let a = scopes.push(ScopeId::ROOT);
        scopes.declare(a, "tmp", Type::Bool, Value::Bool(true)).unwrap();
        scopes.discard(a);
        let b = scopes.push(ScopeId::ROOT);
        assert_eq!(scopes.lookup_type(b, "tmp").unwrap_err().kind(), "UndefinedNameError");
    }
}
