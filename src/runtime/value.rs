use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::types::Type;

/// Shared, mutable array storage
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable dictionary storage
pub type DictRef = Rc<RefCell<Dict>>;

/// Runtime value representation
///
/// Heap kinds share their storage through `Rc`: cloning a value retains the
/// heap object and dropping it releases it. Primitives are copied.
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    /// Absent value
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 32-bit floating-point value (only produced by coercion to `Float`)
    Float(f32),
    /// 64-bit floating-point value
    Double(f64),

    // Heap kinds
    /// Immutable string
    String(Rc<str>),
    /// Ordered, growable sequence
    Array(ArrayRef),
    /// String-keyed dictionary
    Dict(DictRef),
    /// `None` or `Some(value)`
    Optional(Rc<Option<Value>>),
}

/// Dictionary with unique keys and last-write-wins insertion
///
/// Entries keep insertion order, which is also the rendering order.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Rc<str>, Value)>,
}

impl Dict {
    /// Creates an empty dictionary
    pub fn new() -> Self {
        Dict {
            entries: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrows the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Overwrites the value under `key` in place, or appends a new entry
    pub fn set(&mut self, key: Rc<str>, value: Value) -> Result<()> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
            return Ok(());
        }
        self.entries
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory {
                operation: "growing a dictionary".to_string(),
            })?;
        self.entries.push((key, value));
        Ok(())
    }

    /// True when `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl Value {
    /// Creates a string value
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// Creates an array value owning `items`
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates a dictionary value
    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    /// Creates `Some(value)`
    pub fn some(value: Value) -> Self {
        Value::Optional(Rc::new(Some(value)))
    }

    /// Creates an absent optional
    pub fn none() -> Self {
        Value::Optional(Rc::new(None))
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Optional(_) => "optional",
        }
    }

    /// Declared type for a binding initialized from this value without annotation
    pub fn inferred_type(&self) -> Type {
        match self {
            Value::Nil => Type::Any,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Double(_) => Type::Double,
            Value::String(_) => Type::String,
            Value::Array(_) => Type::array_of(Type::Any),
            Value::Dict(_) => Type::dict_of(Type::String, Type::Any),
            Value::Optional(_) => Type::Any.optional(),
        }
    }

    /// True for `Nil` and `None`
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Optional(inner) => inner.is_none(),
            _ => false,
        }
    }

    /// Unwraps `Some(v)` to `v` and `None` to `Nil`; other values are returned as-is
    pub fn unwrap_optional(self) -> Value {
        match self {
            Value::Optional(inner) => match inner.as_ref() {
                Some(v) => v.clone(),
                None => Value::Nil,
            },
            other => other,
        }
    }

    /// True only for `Bool(true)`
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Converts value to a 64-bit integer
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::type_error("int", self.type_name())),
        }
    }

    /// Element or entry count for strings (chars), arrays and dicts
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.borrow().len()),
            Value::Dict(dict) => Some(dict.borrow().len()),
            _ => None,
        }
    }

    /// Appends a retained copy of `item` to an array
    pub fn append(&self, item: Value) -> Result<()> {
        match self {
            Value::Array(items) => {
                let mut items = items.borrow_mut();
                items.try_reserve(1).map_err(|_| Error::OutOfMemory {
                    operation: "appending to an array".to_string(),
                })?;
                items.push(item);
                Ok(())
            }
            _ => Err(Error::UnsupportedMember {
                member: "append".to_string(),
                type_name: self.type_name().to_string(),
            }),
        }
    }

    /// Number of live handles to the heap object, `None` for primitives
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(Rc::strong_count(s)),
            Value::Array(a) => Some(Rc::strong_count(a)),
            Value::Dict(d) => Some(Rc::strong_count(d)),
            Value::Optional(o) => Some(Rc::strong_count(o)),
            _ => None,
        }
    }

    /// True when both values are handles to the same heap object
    pub fn same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Optional(a), Value::Optional(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn container_id(&self) -> Option<*const ()> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const ()),
            Value::Dict(d) => Some(Rc::as_ptr(d) as *const ()),
            _ => None,
        }
    }

    fn render(&self, out: &mut String, nested: bool, active: &mut Vec<*const ()>) {
        if let Some(id) = self.container_id() {
            if active.contains(&id) {
                out.push_str("[...]");
                return;
            }
            active.push(id);
        }

        match self {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&format!("{:.6}", f)),
            Value::Double(d) => out.push_str(&format!("{:.6}", d)),
            Value::String(s) => {
                if nested {
                    out.push('"');
                    out.push_str(s);
                    out.push('"');
                } else {
                    out.push_str(s);
                }
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out, true, active);
                }
                out.push(']');
            }
            Value::Dict(dict) => {
                out.push('[');
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('"');
                    out.push_str(key);
                    out.push_str("\": ");
                    value.render(out, true, active);
                }
                out.push(']');
            }
            Value::Optional(inner) => match inner.as_ref() {
                Some(v) => v.render(out, nested, active),
                None => out.push_str("nil"),
            },
        }

        if self.container_id().is_some() {
            active.pop();
        }
    }
}

/// Top-level rendering, as written by `print`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, false, &mut Vec::new());
        f.write_str(&out)
    }
}

/// Shallow equality: same tag required, containers compare by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a.as_bytes() == b.as_bytes(),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Optional(a), Value::Optional(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::Double(1.0).type_name(), "double");
        assert_eq!(Value::none().type_name(), "optional");
        assert_eq!(Value::dict(Dict::new()).type_name(), "dict");
    }

    #[test]
    fn test_clone_and_drop_balance_ref_count() {
        let arr = Value::array(vec![Value::Int(1)]);
        let before = arr.ref_count();
        let clones: Vec<Value> = (0..5).map(|_| arr.clone()).collect();
        assert_eq!(arr.ref_count(), before.map(|n| n + 5));
        drop(clones);
        assert_eq!(arr.ref_count(), before);
        assert_eq!(Value::Int(3).ref_count(), None);
    }

    #[test]
    fn test_append_retains_element() {
        let s = Value::string("x");
        let arr = Value::array(vec![]);
        arr.append(s.clone()).unwrap();
        assert_eq!(s.ref_count(), Some(2));
        drop(arr);
        assert_eq!(s.ref_count(), Some(1));
    }

    #[test]
    fn test_dict_set_overwrites_in_place() {
        let mut dict = Dict::new();
        dict.set(Rc::from("a"), Value::Int(1)).unwrap();
        dict.set(Rc::from("b"), Value::Int(2)).unwrap();
        dict.set(Rc::from("a"), Value::Int(3)).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("a"), Some(&Value::Int(3)));
        assert_eq!(dict.keys()[0].as_ref(), "a");
    }

    #[test]
    fn test_shallow_equality() {
        let a = Value::array(vec![Value::Int(1)]);
        let b = Value::array(vec![Value::Int(1)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::string("hi"), Value::string("hi"));
        assert_ne!(Value::Int(1), Value::Double(1.0));
    }

    #[test]
    fn test_rendering() {
        let mut dict = Dict::new();
        dict.set(Rc::from("k"), Value::string("v")).unwrap();
        let arr = Value::array(vec![
            Value::Int(1),
            Value::string("two"),
            Value::Double(3.5),
            Value::none(),
            Value::dict(dict),
        ]);
        assert_eq!(
            arr.to_string(),
            r#"[1, "two", 3.500000, nil, ["k": "v"]]"#
        );
        assert_eq!(Value::string("plain").to_string(), "plain");
        assert_eq!(Value::some(Value::string("in")).to_string(), "in");
        assert_eq!(Value::dict(Dict::new()).to_string(), "[]");
    }

    #[test]
    fn test_self_containing_array_renders() {
        let arr = Value::array(vec![Value::Int(1)]);
        arr.append(arr.clone()).unwrap();
        assert_eq!(arr.to_string(), "[1, [...]]");
        // break the cycle so the test does not leak
        if let Value::Array(items) = &arr {
            items.borrow_mut().clear();
        }
    }
}
