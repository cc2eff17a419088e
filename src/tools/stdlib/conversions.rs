//! Conversion builtins: `type`, `str`, `int` and `float`

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{Tool, ToolRegistry};

/// Register all conversion tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(TypeTool);
    registry.register(StrTool);
    registry.register(IntTool);
    registry.register(FloatTool);
}

/// TYPE - Runtime type name
pub struct TypeTool;

impl Tool for TypeTool {
    fn name(&self) -> &str {
        "type"
    }

    fn description(&self) -> &str {
        "Runtime type name: nil, bool, int, float, double, string, array, dict or optional"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::string(super::first_arg("type", args)?.type_name()))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// STR - Printed form of a value
pub struct StrTool;

impl Tool for StrTool {
    fn name(&self) -> &str {
        "str"
    }

    fn description(&self) -> &str {
        "Converts a value to the string `print` would write"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        match super::first_arg("str", args)? {
            s @ Value::String(_) => Ok(s.clone()),
            other => Ok(Value::string(&other.to_string())),
        }
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// INT - Convert to integer (truncating)
pub struct IntTool;

impl Tool for IntTool {
    fn name(&self) -> &str {
        "int"
    }

    fn description(&self) -> &str {
        "Converts a number, bool or numeric string to int"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        match super::first_arg("int", args)? {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Float(f) => Ok(Value::Int(*f as i64)),
            Value::Double(d) => Ok(Value::Int(*d as i64)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::String(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                Error::invalid_args("int", format!("cannot parse \"{}\" as int", s))
            }),
            other => Err(Error::type_error("number, bool or string", other.type_name())),
        }
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// FLOAT - Convert to double
pub struct FloatTool;

impl Tool for FloatTool {
    fn name(&self) -> &str {
        "float"
    }

    fn description(&self) -> &str {
        "Converts a number or numeric string to double"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        match super::first_arg("float", args)? {
            Value::Int(n) => Ok(Value::Double(*n as f64)),
            Value::Float(f) => Ok(Value::Double(*f as f64)),
            Value::Double(d) => Ok(Value::Double(*d)),
            Value::String(s) => s.trim().parse::<f64>().map(Value::Double).map_err(|_| {
                Error::invalid_args("float", format!("cannot parse \"{}\" as float", s))
            }),
            other => Err(Error::type_error("number or string", other.type_name())),
        }
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}
