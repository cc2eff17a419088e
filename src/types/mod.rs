//! # Crumb Declared Types
//!
//! Types appear in source only as annotations: on declarations, function
//! parameters and function return types.
//!
//! ```text
//! let count: Int = 0
//! let ratio: Double = 0.5
//! let names: [String] = ["a", "b"]
//! let ages: [String: Int] = ["ann": 31]
//! let maybe: Int? = nil
//! ```
//!
//! Declared types drive coercion at assignment and call-binding time (see
//! [`crate::runtime::coerce`]); there is no static checking pass. Unannotated
//! declarations take their type from the value they are initialized with,
//! using [`Type::Any`] for parts that cannot be known from a single value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a binding, parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    // === Primitives ===
    /// 64-bit signed integer
    Int,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Boolean
    Bool,
    /// Immutable string
    String,

    // === Containers ===
    /// Array: `[T]`
    Array(Box<Type>),
    /// Dictionary: `[K: V]`
    Dict {
        /// Key type (always `String` at runtime)
        key: Box<Type>,
        /// Value type
        value: Box<Type>,
    },
    /// Optional: `T?`
    Optional(Box<Type>),

    /// Accepts any value unchanged (inferred declarations only)
    Any,
}

impl Type {
    /// Parse a primitive type from its annotation name
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "Int" => Some(Type::Int),
            "Float" => Some(Type::Float),
            "Double" => Some(Type::Double),
            "Bool" => Some(Type::Bool),
            "String" => Some(Type::String),
            _ => None,
        }
    }

    /// Wrap this type as `T?`
    pub fn optional(self) -> Type {
        Type::Optional(Box::new(self))
    }

    /// Build `[T]`
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// Build `[K: V]`
    pub fn dict_of(key: Type, value: Type) -> Type {
        Type::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Check if this type is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Double)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Double => write!(f, "Double"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Array(element) => write!(f, "[{}]", element),
            Type::Dict { key, value } => write!(f, "[{}: {}]", key, value),
            Type::Optional(inner) => write!(f, "{}?", inner),
            Type::Any => write!(f, "Any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let ty = Type::dict_of(Type::String, Type::array_of(Type::Int.optional()));
        assert_eq!(ty.to_string(), "[String: [Int?]]");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Type::from_name("Double"), Some(Type::Double));
        assert_eq!(Type::from_name("double"), None);
        assert_eq!(Type::from_name("Any"), None);
        assert!(Type::Float.is_numeric());
        assert!(!Type::String.is_numeric());
    }
}
