//! Scalar values and the static types that describe them.

use std::fmt;

/// Static type tags used by the checker, declarations and signatures.
///
/// Only `Int`, `Float`, `Str` and `Bool` can be written in source. `Unit` is
/// the type of empty branches and bodies, and `Unknown` marks an expression
/// whose branches disagree (see [`Type::is_known`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Unit,
    Unknown,
}

impl Type {
    /// `true` for `Int` and `Float`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_known(self) -> bool {
        self != Type::Unknown
    }

    /// Source keyword for a nameable type (`int`, `float`, `str`, `bool`).
    pub fn keyword(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::Bool => "bool",
            Type::Unit => "unit",
            Type::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value
    Int(i64),
    /// A 64-bit floating-point value
    Float(f64),
    /// A UTF-8 encoded string value
    Str(String),
    /// A boolean value (True or False)
    Bool(bool),
    /// The unit value representing "no value"
    Unit,
}

impl Value {
    /// The runtime type tag of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::Bool(_) => Type::Bool,
            Value::Unit => Type::Unit,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }
}

/// Canonical float rendering: shortest round-trip digits, always with a
/// fractional part so `3.0` never prints as `3`.
fn format_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 {
        write!(f, "{:.1}", x)
    } else if x.is_nan() {
        f.write_str("nan")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "inf" } else { "-inf" })
    } else {
        write!(f, "{}", x)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => format_float(f, *x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Value::Unit => f.write_str("<unit>"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
