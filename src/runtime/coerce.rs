//! Conversion of runtime values to declared types
//!
//! Applied when a value is bound to a declaration, assigned, passed as an
//! argument or returned from a function. Numeric conversions are permitted in
//! both directions; narrowing truncates.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::types::Type;

/// Coerce `value` to `target`, or fail with [`Error::TypeMismatch`]
pub fn coerce(target: &Type, value: Value) -> Result<Value> {
    match (target, value) {
        (Type::Any, value) => Ok(value),

        (Type::Optional(_), Value::Nil) => Ok(Value::none()),
        (Type::Optional(inner), Value::Optional(opt)) => match opt.as_ref() {
            None => Ok(Value::Optional(opt)),
            Some(current) => {
                let converted = coerce(inner, current.clone())?;
                if converted == *current {
                    Ok(Value::Optional(opt))
                } else {
                    Ok(Value::Optional(Rc::new(Some(converted))))
                }
            }
        },
        (Type::Optional(inner), value) => Ok(Value::some(coerce(inner, value)?)),

        (Type::Int, Value::Int(n)) => Ok(Value::Int(n)),
        (Type::Int, Value::Float(f)) => Ok(Value::Int(f as i64)),
        (Type::Int, Value::Double(d)) => Ok(Value::Int(d as i64)),

        (Type::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (Type::Float, Value::Int(n)) => Ok(Value::Float(n as f32)),
        (Type::Float, Value::Double(d)) => Ok(Value::Float(d as f32)),

        (Type::Double, Value::Double(d)) => Ok(Value::Double(d)),
        (Type::Double, Value::Int(n)) => Ok(Value::Double(n as f64)),
        (Type::Double, Value::Float(f)) => Ok(Value::Double(f as f64)),

        (Type::Bool, v @ Value::Bool(_)) => Ok(v),
        (Type::String, v @ Value::String(_)) => Ok(v),
        (Type::Array(_), v @ Value::Array(_)) => Ok(v),
        (Type::Dict { .. }, v @ Value::Dict(_)) => Ok(v),

        (target, value) => Err(Error::TypeMismatch {
            target: target.to_string(),
            got: value.type_name().to_string(),
        }),
    }
}
