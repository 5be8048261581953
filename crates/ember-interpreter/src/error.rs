//! Runtime and type-checking errors raised by the interpreter.

use ember_syntax::ast::BinOp;
use ember_syntax::value::Type;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpreterError {
    /// Name already bound in the same scope.
    #[error("'{name}' is already declared in this scope")]
    Redeclaration { name: String },

    #[error("Undefined name '{name}'")]
    UndefinedName { name: String },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },

    /// A declared type disagrees with the type of the value bound to it.
    #[error("Type mismatch for '{name}': expected {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("Type error: {message}")]
    TypeError { message: String },

    #[error("Unsupported operand {op} between {lhs} and {rhs}")]
    UnsupportedOperand { op: BinOp, lhs: Type, rhs: Type },

    #[error("Cannot convert {value} to {target}")]
    Conversion { value: String, target: Type },

    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    /// `position` is 1-based.
    #[error("Argument {position} of '{function}' should be {expected}, got {found}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: Type,
        found: Type,
    },

    #[error("Function '{name}' is already defined")]
    DuplicateFunction { name: String },

    #[error("Arithmetic error: {message}")]
    Arithmetic { message: String },

    #[error("Maximum call depth of {limit} exceeded in '{function}'")]
    RecursionLimit { function: String, limit: usize },
}

impl InterpreterError {
    /// Stable kind name, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            InterpreterError::Redeclaration { .. } => "RedeclarationError",
            InterpreterError::UndefinedName { .. } => "UndefinedNameError",
            InterpreterError::UndefinedFunction { .. } => "UndefinedFunctionError",
            InterpreterError::TypeMismatch { .. } => "TypeMismatchError",
            InterpreterError::TypeError { .. } => "TypeError",
            InterpreterError::UnsupportedOperand { .. } => "UnsupportedOperandError",
            InterpreterError::Conversion { .. } => "ConversionError",
            InterpreterError::Arity { .. } => "ArityError",
            InterpreterError::ArgumentType { .. } => "ArgumentTypeError",
            InterpreterError::DuplicateFunction { .. } => "DuplicateFunctionError",
            InterpreterError::Arithmetic { .. } => "ArithmeticError",
            InterpreterError::RecursionLimit { .. } => "RecursionLimitError",
        }
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        InterpreterError::TypeError {
            message: message.into(),
        }
    }

    pub(crate) fn arithmetic(message: impl Into<String>) -> Self {
        InterpreterError::Arithmetic {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InterpreterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let err = InterpreterError::Redeclaration { name: "x".into() };
        assert_eq!(err.kind(), "RedeclarationError");
        assert_eq!(err.to_string(), "'x' is already declared in this scope");

        let err = InterpreterError::UnsupportedOperand {
            op: BinOp::Sub,
            lhs: Type::Str,
            rhs: Type::Int,
        };
        assert_eq!(err.kind(), "UnsupportedOperandError");
        assert_eq!(err.to_string(), "Unsupported operand - between str and int");
    }

    #[test]
    fn argument_type_message() {
        let err = InterpreterError::ArgumentType {
            function: "f".into(),
            position: 2,
            expected: Type::Int,
            found: Type::Str,
        };
        assert_eq!(err.to_string(), "Argument 2 of 'f' should be int, got str");
        assert_eq!(err.kind(), "ArgumentTypeError");
    }
}
