//! Builtin functions for Crumb
//!
//! Builtins are [`Tool`]s held in a [`ToolRegistry`]. Calls resolve to user
//! functions first, so a script may shadow any builtin by declaring a function
//! of the same name.

pub mod stdlib;

use crate::error::{Error, Result};
use crate::runtime::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool trait - all builtins implement this
pub trait Tool: Send + Sync {
    /// Name the builtin is called by
    fn name(&self) -> &str;

    /// Tool description
    fn description(&self) -> &str;

    /// Execute the tool with evaluated arguments
    fn execute(&self, args: &[Value]) -> Result<Value>;

    /// Exact argument count, checked before `execute`
    fn arity(&self) -> Option<usize> {
        None // None means the tool validates its own arguments
    }
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create new registry with standard library
    pub fn new() -> Self {
        let mut registry = ToolRegistry::empty();

        // Register all standard library tools
        stdlib::register_all(&mut registry);

        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get tool by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedFunction {
                name: name.to_string(),
            })
    }

    /// Checks arity and runs the named tool
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let tool = self.get(name)?;
        if let Some(expected) = tool.arity() {
            if args.len() != expected {
                return Err(Error::ArityMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    got: args.len(),
                });
            }
        }
        tool.execute(args)
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
