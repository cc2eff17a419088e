//! Name resolution against loaded modules
//!
//! Module loading, path resolution and linking live outside the interpreter.
//! The interpreter only asks a [`ModuleResolver`] for names it cannot find in
//! its own scopes, function table or builtins.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::parser::FunctionDecl;
use crate::runtime::Value;

/// Symbol exported by a module
#[derive(Debug, Clone)]
pub enum Symbol {
    /// Exported value, read like a variable
    Value(Value),
    /// Exported function, called like a user function
    Function(Rc<FunctionDecl>),
}

/// Resolves names the interpreter does not bind itself
pub trait ModuleResolver {
    /// Returns `Ok(None)` when the name is not exported by any loaded module
    fn resolve(&self, name: &str) -> Result<Option<Symbol>>;
}

/// In-memory export table
#[derive(Debug, Default)]
pub struct ModuleTable {
    exports: HashMap<String, Symbol>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exports a value under `name`
    pub fn export_value(&mut self, name: impl Into<String>, value: Value) {
        self.exports.insert(name.into(), Symbol::Value(value));
    }

    /// Exports a function under its declared name
    pub fn export_function(&mut self, decl: FunctionDecl) {
        self.exports
            .insert(decl.name.clone(), Symbol::Function(Rc::new(decl)));
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl ModuleResolver for ModuleTable {
    fn resolve(&self, name: &str) -> Result<Option<Symbol>> {
        Ok(self.exports.get(name).cloned())
    }
}
