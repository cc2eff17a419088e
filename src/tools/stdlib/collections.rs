//! Collection builtins: `range` and `len`

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{Tool, ToolRegistry};

/// Register all collection tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(RangeTool);
    registry.register(LenTool);
}

/// Half-open bounds of a `range(...)` call: `range(n)` is `0..n`, `range(a, b)` is `a..b`
pub fn range_bounds(args: &[Value]) -> Result<(i64, i64)> {
    match args {
        [end] => Ok((0, int_arg(end)?)),
        [start, end] => Ok((int_arg(start)?, int_arg(end)?)),
        _ => Err(Error::ArityMismatch {
            name: "range".to_string(),
            expected: "1 to 2".to_string(),
            got: args.len(),
        }),
    }
}

fn int_arg(value: &Value) -> Result<i64> {
    value
        .as_int()
        .map_err(|_| Error::invalid_args("range", format!("expected int, got {}", value.type_name())))
}

/// RANGE - Array of consecutive integers
pub struct RangeTool;

impl Tool for RangeTool {
    fn name(&self) -> &str {
        "range"
    }

    fn description(&self) -> &str {
        "Array of integers from start (default 0) up to, not including, end"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        let (start, end) = range_bounds(args)?;
        let len = usize::try_from(end.saturating_sub(start)).unwrap_or(0);

        let mut items = Vec::new();
        items.try_reserve(len).map_err(|_| Error::OutOfMemory {
            operation: format!("building range({}, {})", start, end),
        })?;
        items.extend((start..end).map(Value::Int));
        Ok(Value::array(items))
    }
}

/// LEN - Length of a string, array or dictionary
pub struct LenTool;

impl Tool for LenTool {
    fn name(&self) -> &str {
        "len"
    }

    fn description(&self) -> &str {
        "Number of characters, elements or entries"
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        let value = super::first_arg("len", args)?;
        match value.len() {
            Some(n) => Ok(Value::Int(n as i64)),
            None => Err(Error::invalid_args(
                "len",
                format!("{} has no length", value.type_name()),
            )),
        }
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert_eq!(RangeTool.execute(&[Value::Int(3)]).unwrap().to_string(), "[0, 1, 2]");
        assert_eq!(
            RangeTool
                .execute(&[Value::Int(2), Value::Int(5)])
                .unwrap()
                .to_string(),
            "[2, 3, 4]"
        );
        assert_eq!(RangeTool.execute(&[Value::Int(-2)]).unwrap().to_string(), "[]");
        assert!(RangeTool.execute(&[Value::Double(2.0)]).is_err());
        assert!(RangeTool.execute(&[]).is_err());
    }

    #[test]
    fn test_len() {
        assert_eq!(LenTool.execute(&[Value::string("héllo")]).unwrap(), Value::Int(5));
        assert_eq!(
            LenTool
                .execute(&[Value::array(vec![Value::Nil, Value::Nil])])
                .unwrap(),
            Value::Int(2)
        );
        assert!(LenTool.execute(&[Value::Int(1)]).is_err());
        assert!(matches!(
            LenTool.execute(&[]),
            Err(Error::InvalidArguments { .. })
        ));
    }
}
