use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::FunctionDecl;

/// User functions, registered by name when their declaration executes
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Rc<FunctionDecl>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration; a second declaration under the same name is an error
    pub fn define(&mut self, decl: &FunctionDecl) -> Result<()> {
        if self.functions.contains_key(&decl.name) {
            return Err(Error::FunctionRedefinition {
                name: decl.name.clone(),
            });
        }
        self.functions
            .insert(decl.name.clone(), Rc::new(decl.clone()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}
