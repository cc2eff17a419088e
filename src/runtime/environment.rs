use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::runtime::coerce::coerce;
use crate::runtime::Value;
use crate::types::Type;

/// A named, typed binding
#[derive(Debug, Clone)]
pub struct Variable {
    /// Declared type; every stored value has been coerced to it
    pub ty: Type,
    /// Current value
    pub value: Value,
    /// Constants reject assignment
    pub is_const: bool,
}

/// What pushed a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Bottom frame, lives as long as the environment
    Global,
    /// Block or loop body
    Block,
    /// Function-call activation; lookups do not see past it except into the global frame
    Function,
}

/// Single scope in the environment
#[derive(Debug)]
struct Scope {
    /// Variables defined in this scope
    variables: HashMap<String, Variable>,
    kind: ScopeKind,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Scope {
            variables: HashMap::new(),
            kind,
        }
    }
}

/// Lexical scope stack
#[derive(Debug)]
pub struct Environment {
    /// Stack of nested scopes; index 0 is the global scope
    scopes: Vec<Scope>,
}

impl Environment {
    /// Creates a new environment with a global scope
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::new(ScopeKind::Global)],
        }
    }

    /// Enters a new block scope
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Block));
    }

    /// Enters a function-call scope
    pub fn push_function_scope(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Function));
    }

    /// Exits the current scope, releasing its bindings. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declares a new binding in the current scope
    pub fn declare(&mut self, name: &str, ty: Type, value: Value, is_const: bool) -> Result<()> {
        if self.current().variables.contains_key(name) {
            return Err(Error::Redeclaration {
                name: name.to_string(),
            });
        }
        let value = coerce(&ty, value)?;
        self.current_mut().variables.insert(
            name.to_string(),
            Variable {
                ty,
                value,
                is_const,
            },
        );
        Ok(())
    }

    /// Binds `name` in the current scope, replacing any binding already there
    pub fn rebind(&mut self, name: &str, value: Value) {
        let ty = value.inferred_type();
        self.current_mut().variables.insert(
            name.to_string(),
            Variable {
                ty,
                value,
                is_const: false,
            },
        );
    }

    /// Gets a visible binding by name
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.resolve(name)
            .and_then(|idx| self.scopes[idx].variables.get(name))
    }

    /// Assigns to an existing, non-constant binding after coercing to its declared type
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        let idx = self.resolve(name).ok_or_else(|| Error::UndefinedVariable {
            name: name.to_string(),
        })?;
        let Some(var) = self.scopes[idx].variables.get_mut(name) else {
            return Err(Error::UndefinedVariable {
                name: name.to_string(),
            });
        };
        if var.is_const {
            return Err(Error::ConstantReassignment {
                name: name.to_string(),
            });
        }
        var.value = coerce(&var.ty, value)?;
        Ok(())
    }

    /// Checks if a binding is visible from the current scope
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the current scope depth (1 for global scope)
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Index of the innermost visible scope binding `name`
    fn resolve(&self, name: &str) -> Option<usize> {
        let boundary = self
            .scopes
            .iter()
            .rposition(|s| s.kind == ScopeKind::Function)
            .unwrap_or(0);

        (boundary..self.scopes.len())
            .rev()
            .chain((boundary > 0).then_some(0))
            .find(|&idx| self.scopes[idx].variables.contains_key(name))
    }

    fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
