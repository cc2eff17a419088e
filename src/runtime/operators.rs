//! Binary and unary operator semantics
//!
//! Integer operands stay integers; any `Float` or `Double` operand promotes
//! both sides to `Double`. Ordering comparisons promote the same way, but
//! `==` never does. `&&` and `||` short-circuit in the interpreter and
//! only reach [`binary_op`] with both operands evaluated.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::parser::{BinaryOp, UnaryOp};
use crate::runtime::Value;

/// Numeric operand pair after promotion
enum Numbers {
    Ints(i64, i64),
    Doubles(f64, f64),
}

fn as_double(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

fn promote(left: &Value, right: &Value) -> Option<Numbers> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Some(Numbers::Ints(*a, *b));
    }
    Some(Numbers::Doubles(as_double(left)?, as_double(right)?))
}

fn invalid(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::InvalidOperation {
        op: op.to_string(),
        left_type: left.type_name().to_string(),
        right_type: right.type_name().to_string(),
    }
}

fn overflow(op: BinaryOp) -> Error {
    Error::IntegerOverflow { op: op.to_string() }
}

/// Applies a binary operator to two evaluated operands
pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            let ordering = compare(left, right)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Some(Ordering::Less),
                BinaryOp::Gt => ordering == Some(Ordering::Greater),
                BinaryOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            }))
        }
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(invalid(op, left, right)),
        },
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let (BinaryOp::Add, Value::String(a), Value::String(b)) = (op, left, right) {
        let mut joined = String::with_capacity(a.len() + b.len());
        joined.push_str(a);
        joined.push_str(b);
        return Ok(Value::string(&joined));
    }

    match promote(left, right).ok_or_else(|| invalid(op, left, right))? {
        Numbers::Ints(a, b) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div if b == 0 => return Err(Error::DivisionByZero),
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Mod if b == 0 => return Err(Error::ModuloByZero),
                _ => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or_else(|| overflow(op))
        }
        Numbers::Doubles(a, b) => match op {
            BinaryOp::Add => Ok(Value::Double(a + b)),
            BinaryOp::Sub => Ok(Value::Double(a - b)),
            BinaryOp::Mul => Ok(Value::Double(a * b)),
            BinaryOp::Div if b == 0.0 => Err(Error::DivisionByZero),
            BinaryOp::Div => Ok(Value::Double(a / b)),
            _ => Err(invalid(op, left, right)),
        },
    }
}

/// `==` semantics: same tag required, so `1 == 1.0` is false. Containers and
/// optionals compare by identity.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    left == right
}

/// Ordering for `< > <= >=`; `None` when a NaN is involved
fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>> {
    if let Some(numbers) = promote(left, right) {
        return Ok(match numbers {
            Numbers::Ints(a, b) => Some(a.cmp(&b)),
            Numbers::Doubles(a, b) => a.partial_cmp(&b),
        });
    }
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.as_bytes().cmp(b.as_bytes()))),
        _ => Err(Error::InvalidComparison {
            left_type: left.type_name().to_string(),
            right_type: right.type_name().to_string(),
        }),
    }
}

/// Applies a unary operator
pub fn unary_op(op: UnaryOp, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, other) => Err(Error::type_error("bool", other.type_name())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::IntegerOverflow {
                op: "-".to_string(),
            }),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Neg, other) => Err(Error::type_error("number", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
        binary_op(op, &l, &r)
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(bin(BinaryOp::Add, Value::Int(2), Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(bin(BinaryOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Int(3));
        assert_eq!(bin(BinaryOp::Mod, Value::Int(7), Value::Int(3)).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_promotion_to_double() {
        assert_eq!(
            bin(BinaryOp::Mul, Value::Int(2), Value::Double(1.5)).unwrap(),
            Value::Double(3.0)
        );
        assert_eq!(
            bin(BinaryOp::Add, Value::Float(0.5), Value::Float(0.25)).unwrap(),
            Value::Double(0.75)
        );
    }

    #[test]
    fn test_division_and_modulo_errors() {
        assert_eq!(
            bin(BinaryOp::Div, Value::Int(1), Value::Int(0)).unwrap_err(),
            Error::DivisionByZero
        );
        assert_eq!(
            bin(BinaryOp::Mod, Value::Int(1), Value::Int(0)).unwrap_err(),
            Error::ModuloByZero
        );
        assert_eq!(
            bin(BinaryOp::Div, Value::Double(1.0), Value::Int(0)).unwrap_err(),
            Error::DivisionByZero
        );
        assert!(bin(BinaryOp::Mod, Value::Double(5.0), Value::Int(2)).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            bin(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)),
            Err(Error::IntegerOverflow { .. })
        ));
        assert!(bin(BinaryOp::Div, Value::Int(i64::MIN), Value::Int(-1)).is_err());
        assert!(unary_op(UnaryOp::Neg, &Value::Int(i64::MIN)).is_err());
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            bin(BinaryOp::Add, Value::string("ab"), Value::string("cd")).unwrap(),
            Value::string("abcd")
        );
        assert!(matches!(
            bin(BinaryOp::Add, Value::string("n="), Value::Int(1)),
            Err(Error::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(bin(BinaryOp::Lt, Value::Int(1), Value::Double(1.5)).unwrap(), Value::Bool(true));
        assert_eq!(
            bin(BinaryOp::GtEq, Value::string("b"), Value::string("a")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            bin(BinaryOp::Lt, Value::Bool(false), Value::Bool(true)).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            bin(BinaryOp::Lt, Value::string("a"), Value::Int(1)),
            Err(Error::InvalidComparison { .. })
        ));
    }

    #[test]
    fn test_equality() {
        assert!(values_equal(&Value::Double(1.5), &Value::Double(1.5)));
        assert!(!values_equal(&Value::Int(1), &Value::string("1")));
        assert!(values_equal(&Value::Nil, &Value::Nil));
        assert!(!values_equal(&Value::Nil, &Value::none()));
        let a = Value::array(vec![]);
        assert!(values_equal(&a, &a.clone()));
        assert!(!values_equal(&a, &Value::array(vec![])));
    }

    #[test]
    fn test_equality_does_not_promote() {
        assert_eq!(
            bin(BinaryOp::Eq, Value::Int(1), Value::Double(1.0)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            bin(BinaryOp::NotEq, Value::Int(1), Value::Double(1.0)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            bin(BinaryOp::Eq, Value::Float(0.5), Value::Double(0.5)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            bin(BinaryOp::LtEq, Value::Int(1), Value::Double(1.0)).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_logical_requires_bools() {
        assert_eq!(
            bin(BinaryOp::And, Value::Bool(true), Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert!(bin(BinaryOp::Or, Value::Int(1), Value::Bool(false)).is_err());
        assert!(unary_op(UnaryOp::Not, &Value::Int(0)).is_err());
    }
}
