//! Operator typing rules and primitive operations on values.
//!
//! [`binary_result_type`] is the static half of every binary operator: it
//! decides which operand types are accepted and what type comes out.
//! [`apply_binary`] is the dynamic half and agrees with it for every accepted
//! pair.

use std::cmp::Ordering;

use ember_syntax::ast::BinOp;
use ember_syntax::value::{Type, Value};

use crate::error::{InterpreterError, Result};

/// Longest string a `*` repetition may build.
const MAX_REPEAT_LEN: usize = 1 << 28;

fn is_scalar(ty: Type) -> bool {
    matches!(ty, Type::Int | Type::Float | Type::Str | Type::Bool)
}

/// Result type of `lhs op rhs`, or `UnsupportedOperand` when no rule covers the pair.
pub fn binary_result_type(op: BinOp, lhs: Type, rhs: Type) -> Result<Type> {
    let numeric = lhs.is_numeric() && rhs.is_numeric();
    let ty = match op {
        BinOp::Eq | BinOp::Ne if is_scalar(lhs) && is_scalar(rhs) => Some(Type::Bool),
        BinOp::Lt | BinOp::Gt if numeric || (lhs == rhs && matches!(lhs, Type::Str | Type::Bool)) => {
            Some(Type::Bool)
        }
        BinOp::Div if numeric => Some(Type::Float),
        BinOp::Sub | BinOp::Pow if numeric => Some(if lhs == rhs { lhs } else { Type::Float }),
        BinOp::Add if lhs == rhs && matches!(lhs, Type::Int | Type::Float | Type::Str) => Some(lhs),
        BinOp::Mul if lhs == rhs && lhs.is_numeric() => Some(lhs),
        BinOp::Mul if matches!((lhs, rhs), (Type::Int, Type::Str) | (Type::Str, Type::Int)) => Some(Type::Str),
        BinOp::Add | BinOp::Mul if numeric => Some(Type::Float),
        _ => None,
    };
    ty.ok_or(InterpreterError::UnsupportedOperand { op, lhs, rhs })
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn overflow(op: BinOp) -> InterpreterError {
    InterpreterError::arithmetic(format!("integer overflow in '{}'", op))
}

fn repeat(s: &str, count: i64) -> Result<Value> {
    if count <= 0 {
        return Ok(Value::Str(String::new()));
    }
    let total = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(s.len()))
        .filter(|len| *len <= MAX_REPEAT_LEN)
        .ok_or_else(|| InterpreterError::arithmetic("string repetition is too large"))?;
    let mut out = String::with_capacity(total);
    for _ in 0..count {
        out.push_str(s);
    }
    Ok(Value::Str(out))
}

fn int_pow(base: i64, exp: i64) -> Result<Value> {
    if exp < 0 {
        return Err(InterpreterError::arithmetic(
            "negative exponent on an integer base (use a float operand)",
        ));
    }
    u32::try_from(exp)
        .ok()
        .and_then(|e| base.checked_pow(e))
        .map(Value::Int)
        .ok_or_else(|| overflow(BinOp::Pow))
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (a, b) => as_f64(a)?.partial_cmp(&as_f64(b)?),
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (as_f64(lhs), as_f64(rhs)) {
        (Some(_), Some(_)) if lhs.ty() != rhs.ty() => compare(lhs, rhs) == Some(Ordering::Equal),
        _ => lhs == rhs,
    }
}

/// Evaluate `lhs op rhs` on two already-evaluated operands.
pub fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
    let unsupported = |lhs: &Value, rhs: &Value| InterpreterError::UnsupportedOperand {
        op,
        lhs: lhs.ty(),
        rhs: rhs.ty(),
    };
    binary_result_type(op, lhs.ty(), rhs.ty())?;
    let result = match (op, &lhs, &rhs) {
        (BinOp::Eq, a, b) => Value::Bool(values_equal(a, b)),
        (BinOp::Ne, a, b) => Value::Bool(!values_equal(a, b)),
        (BinOp::Lt, a, b) => Value::Bool(compare(a, b) == Some(Ordering::Less)),
        (BinOp::Gt, a, b) => Value::Bool(compare(a, b) == Some(Ordering::Greater)),
        (BinOp::Add, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_add(*b).ok_or_else(|| overflow(op))?)
        }
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_sub(*b).ok_or_else(|| overflow(op))?)
        }
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_mul(*b).ok_or_else(|| overflow(op))?)
        }
        (BinOp::Pow, Value::Int(a), Value::Int(b)) => int_pow(*a, *b)?,
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Value::Str(format!("{}{}", a, b)),
        (BinOp::Mul, Value::Str(s), Value::Int(n)) | (BinOp::Mul, Value::Int(n), Value::Str(s)) => {
            repeat(s, *n)?
        }
        (_, a, b) => {
            let (x, y) = match (as_f64(a), as_f64(b)) {
                (Some(x), Some(y)) => (x, y),
                _ => return Err(unsupported(a, b)),
            };
            match op {
                BinOp::Add => Value::Float(x + y),
                BinOp::Sub => Value::Float(x - y),
                BinOp::Mul => Value::Float(x * y),
                BinOp::Pow => Value::Float(x.powf(y)),
                BinOp::Div if y == 0.0 => {
                    return Err(InterpreterError::arithmetic("division by zero"));
                }
                BinOp::Div => Value::Float(x / y),
                _ => return Err(unsupported(a, b)),
            }
        }
    };
    Ok(result)
}

/// Arithmetic negation of a numeric value.
pub fn negate(value: Value) -> Result<Value> {
    match value {
        Value::Int(n) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| InterpreterError::arithmetic("integer overflow in negation")),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(InterpreterError::type_error(format!(
            "only numbers can be negated, got {}",
            other.ty()
        ))),
    }
}

/// Truthiness: only `bool` values qualify; anything else is a type error.
pub fn truthy(value: &Value, context: &str) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(InterpreterError::type_error(format!(
            "{} expects a bool, got {}",
            context,
            other.ty()
        ))),
    }
}

fn conversion_error(value: &Value, target: Type) -> InterpreterError {
    let rendered = match value {
        Value::Str(s) => format!("\"{}\"", s),
        Value::Unit => "unit".to_string(),
        other => other.to_string(),
    };
    InterpreterError::Conversion {
        value: rendered,
        target,
    }
}

fn float_to_int(x: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let t = x.trunc();
    (t.is_finite() && t >= -LIMIT && t < LIMIT).then_some(t as i64)
}

/// Explicit conversion (`toint`, `tofloat`, `tostr`, `tobool`).
pub fn convert(value: Value, target: Type) -> Result<Value> {
    let converted = match (&value, target) {
        (v, Type::Str) => Some(Value::Str(v.to_string())),
        (v, t) if v.ty() == t => Some(v.clone()),
        (Value::Int(n), Type::Float) => Some(Value::Float(*n as f64)),
        (Value::Int(n), Type::Bool) => Some(Value::Bool(*n != 0)),
        (Value::Float(x), Type::Int) => float_to_int(*x).map(Value::Int),
        (Value::Float(x), Type::Bool) => Some(Value::Bool(*x != 0.0)),
        (Value::Bool(b), Type::Int) => Some(Value::Int(i64::from(*b))),
        (Value::Bool(b), Type::Float) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        (Value::Str(s), Type::Int) => s.trim().parse::<i64>().ok().map(Value::Int),
        (Value::Str(s), Type::Float) => s.trim().parse::<f64>().ok().map(Value::Float),
        (Value::Str(s), Type::Bool) => match s.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    converted.ok_or_else(|| conversion_error(&value, target))
}

/// Implicit coercion used for arguments, return values and branch results:
/// identity, or the lossless widening `int -> float`.
pub fn coerce(value: Value, target: Type) -> std::result::Result<Value, Value> {
    match (value, target) {
        (v, t) if v.ty() == t => Ok(v),
        (Value::Int(n), Type::Float) => Ok(Value::Float(n as f64)),
        (v, _) => Err(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        apply_binary(op, a.into(), b.into())
    }

    #[test]
    fn result_types_follow_the_table() {
        use Type::*;
        assert_eq!(binary_result_type(BinOp::Lt, Int, Float).unwrap(), Bool);
        assert_eq!(binary_result_type(BinOp::Eq, Str, Int).unwrap(), Bool);
        assert_eq!(binary_result_type(BinOp::Div, Int, Int).unwrap(), Float);
        assert_eq!(binary_result_type(BinOp::Sub, Int, Int).unwrap(), Int);
        assert_eq!(binary_result_type(BinOp::Pow, Int, Float).unwrap(), Float);
        assert_eq!(binary_result_type(BinOp::Add, Str, Str).unwrap(), Str);
        assert_eq!(binary_result_type(BinOp::Add, Int, Float).unwrap(), Float);
        assert_eq!(binary_result_type(BinOp::Mul, Str, Int).unwrap(), Str);
        assert_eq!(binary_result_type(BinOp::Mul, Int, Str).unwrap(), Str);
        assert_eq!(binary_result_type(BinOp::Mul, Float, Int).unwrap(), Float);
    }

    #[test]
    fn uncovered_pairs_are_unsupported() {
        use Type::*;
        for (op, a, b) in [
            (BinOp::Add, Str, Int),
            (BinOp::Sub, Str, Str),
            (BinOp::Mul, Str, Str),
            (BinOp::Mul, Float, Str),
            (BinOp::Div, Bool, Int),
            (BinOp::Lt, Str, Int),
            (BinOp::Add, Bool, Bool),
            (BinOp::Eq, Unit, Int),
            (BinOp::Add, Unknown, Int),
        ] {
            assert_eq!(
                binary_result_type(op, a, b).unwrap_err(),
                InterpreterError::UnsupportedOperand { op, lhs: a, rhs: b }
            );
        }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(bin(BinOp::Add, 1, 1.5).unwrap(), Value::Float(2.5));
        assert_eq!(bin(BinOp::Add, 2, 3).unwrap(), Value::Int(5));
        assert_eq!(bin(BinOp::Sub, 2, 3).unwrap(), Value::Int(-1));
        assert_eq!(bin(BinOp::Div, 7, 2).unwrap(), Value::Float(3.5));
        assert_eq!(bin(BinOp::Pow, 2, 10).unwrap(), Value::Int(1024));
        assert_eq!(bin(BinOp::Pow, 4, 0.5).unwrap(), Value::Float(2.0));
        assert_eq!(bin(BinOp::Add, "ab", "cd").unwrap(), Value::from("abcd"));
    }

    #[test]
    fn string_repetition_either_order() {
        assert_eq!(bin(BinOp::Mul, "a", 3).unwrap(), Value::from("aaa"));
        assert_eq!(bin(BinOp::Mul, 3, "a").unwrap(), Value::from("aaa"));
        assert_eq!(bin(BinOp::Mul, "a", -2).unwrap(), Value::from(""));
    }

    #[test]
    fn arithmetic_errors() {
        assert_eq!(bin(BinOp::Div, 1, 0).unwrap_err().kind(), "ArithmeticError");
        assert_eq!(bin(BinOp::Div, 1.0, 0.0).unwrap_err().kind(), "ArithmeticError");
        assert_eq!(bin(BinOp::Add, i64::MAX, 1).unwrap_err().kind(), "ArithmeticError");
        assert_eq!(bin(BinOp::Pow, 2, -1).unwrap_err().kind(), "ArithmeticError");
        assert_eq!(bin(BinOp::Pow, 10, 40).unwrap_err().kind(), "ArithmeticError");
        assert_eq!(bin(BinOp::Mul, "ab", i64::MAX).unwrap_err().kind(), "ArithmeticError");
    }

    #[test]
    fn comparisons() {
        assert_eq!(bin(BinOp::Eq, 1, 1.0).unwrap(), Value::Bool(true));
        assert_eq!(bin(BinOp::Ne, 1, "1").unwrap(), Value::Bool(true));
        assert_eq!(bin(BinOp::Lt, 1, 1.5).unwrap(), Value::Bool(true));
        assert_eq!(bin(BinOp::Gt, "b", "a").unwrap(), Value::Bool(true));
        assert_eq!(bin(BinOp::Lt, false, true).unwrap(), Value::Bool(true));
        assert_eq!(bin(BinOp::Lt, "a", 1).unwrap_err().kind(), "UnsupportedOperandError");
    }

    #[test]
    fn negation_and_truthiness() {
        assert_eq!(negate(Value::Int(3)).unwrap(), Value::Int(-3));
        assert_eq!(negate(Value::Float(1.5)).unwrap(), Value::Float(-1.5));
        assert_eq!(negate(Value::from("x")).unwrap_err().kind(), "TypeError");
        assert_eq!(negate(Value::Int(i64::MIN)).unwrap_err().kind(), "ArithmeticError");
        assert!(truthy(&Value::Bool(true), "if").unwrap());
        assert_eq!(truthy(&Value::Int(1), "if").unwrap_err().kind(), "TypeError");
    }

    #[test]
    fn conversions() {
        assert_eq!(convert(Value::from("7"), Type::Int).unwrap(), Value::Int(7));
        assert_eq!(convert(Value::from(" 2.5 "), Type::Float).unwrap(), Value::Float(2.5));
        assert_eq!(convert(Value::Int(42), Type::Str).unwrap(), Value::from("42"));
        assert_eq!(convert(Value::Float(3.0), Type::Str).unwrap(), Value::from("3.0"));
        assert_eq!(convert(Value::Float(-2.7), Type::Int).unwrap(), Value::Int(-2));
        assert_eq!(convert(Value::Int(2), Type::Float).unwrap(), Value::Float(2.0));
        assert_eq!(convert(Value::Bool(true), Type::Int).unwrap(), Value::Int(1));
        assert_eq!(convert(Value::from("False"), Type::Bool).unwrap(), Value::Bool(false));
        assert_eq!(convert(Value::Int(0), Type::Bool).unwrap(), Value::Bool(false));
        assert_eq!(convert(Value::Unit, Type::Str).unwrap(), Value::from("<unit>"));
    }

    #[test]
    fn conversion_failures() {
        let err = convert(Value::from("abc"), Type::Int).unwrap_err();
        assert_eq!(
            err,
            InterpreterError::Conversion {
                value: "\"abc\"".into(),
                target: Type::Int,
            }
        );
        assert_eq!(convert(Value::from("7.5"), Type::Int).unwrap_err().kind(), "ConversionError");
        assert_eq!(convert(Value::Float(f64::NAN), Type::Int).unwrap_err().kind(), "ConversionError");
        assert_eq!(convert(Value::Float(1e300), Type::Int).unwrap_err().kind(), "ConversionError");
        assert_eq!(convert(Value::from("yes"), Type::Bool).unwrap_err().kind(), "ConversionError");
        assert_eq!(convert(Value::Unit, Type::Int).unwrap_err().kind(), "ConversionError");
    }

    #[test]
    fn implicit_coercion() {
        assert_eq!(coerce(Value::Int(1), Type::Float), Ok(Value::Float(1.0)));
        assert_eq!(coerce(Value::Int(1), Type::Int), Ok(Value::Int(1)));
        assert_eq!(coerce(Value::Float(1.5), Type::Int), Err(Value::Float(1.5)));
        assert_eq!(coerce(Value::Int(1), Type::Str), Err(Value::Int(1)));
    }
}
