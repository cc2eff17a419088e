//! Standard library builtins for Crumb

pub mod collections;
pub mod conversions;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::ToolRegistry;

/// Register all standard library tools
pub fn register_all(registry: &mut ToolRegistry) {
    collections::register(registry);
    conversions::register(registry);
}

/// First argument of a single-argument builtin
fn first_arg<'a>(tool: &str, args: &'a [Value]) -> Result<&'a Value> {
    args.first()
        .ok_or_else(|| Error::invalid_args(tool, "expected 1 argument, got none"))
}
