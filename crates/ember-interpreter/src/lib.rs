//! Ember interpreter: a typed tree-walking evaluator.
//!
//! A [`Program`] owns the global scope, the function registry and the output
//! sink. Every node is type-checked (see [`checker`]) at the point where it is
//! evaluated, not in a separate up-front pass.

pub mod checker;
pub mod config;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod ops;
pub mod optimize;
pub mod output;
pub mod scope;
mod stack;

pub use config::InterpreterConfig;
pub use ember_syntax::value::{Type, Value};
pub use error::{InterpreterError, Result};
pub use function::{Function, FunctionRegistry};
pub use interpreter::Program;
pub use output::PrintHandler;
pub use scope::{Binding, ScopeId, Scopes};
