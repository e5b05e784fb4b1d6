//! Host values.
//!
//! The host is a dynamically typed scripting language with a single numeric
//! type, immutable strings and mutable tables that have both an array part
//! (1-based) and a hash part. Objects the binding creates appear as
//! [`Value::Handle`]s; host closures as [`Value::Function`]s.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::{ObjectHandle, TypeHash};

/// Shared, mutable table reference.
pub type TableRef = Rc<RefCell<Table>>;

/// A dynamically typed host value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    /// Binary string, such as pixel data or a stream chunk.
    Bytes(Rc<[u8]>),
    Table(TableRef),
    Handle(ObjectHandle),
    Function(ObjectHandle),
}

impl Value {
    /// Host type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) | Value::Bytes(_) => "string",
            Value::Table(_) => "table",
            Value::Handle(_) => "userdata",
            Value::Function(_) => "function",
        }
    }

    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn bytes(b: impl AsRef<[u8]>) -> Value {
        Value::Bytes(Rc::from(b.as_ref()))
    }

    pub fn table(table: Table) -> Value {
        Value::Table(Rc::new(RefCell::new(table)))
    }

    /// Array table of `values`.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Value {
        Value::table(Table::from_values(values))
    }

    /// Array table of numbers.
    pub fn numbers(values: impl IntoIterator<Item = f64>) -> Value {
        Value::list(values.into_iter().map(Value::Number))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Host truthiness: everything except `nil` and `false`.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<ObjectHandle> {
        match self {
            Value::Handle(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<ObjectHandle> {
        match self {
            Value::Function(h) => Some(*h),
            _ => None,
        }
    }

    /// Field of a table value; `nil` for anything else.
    pub fn get(&self, field: &str) -> Value {
        self.as_table().map(|t| t.borrow().field(field)).unwrap_or_default()
    }

    /// Array element of a table value (1-based); `nil` for anything else.
    pub fn index(&self, i: usize) -> Value {
        self.as_table().map(|t| t.borrow().index(i)).unwrap_or_default()
    }

    /// Array length of a table value.
    pub fn len(&self) -> usize {
        self.as_table().map_or(0, |t| t.borrow().len())
    }

    /// Tag of a tagged table value.
    pub fn table_tag(&self) -> Option<TypeHash> {
        self.as_table().and_then(|t| t.borrow().tag())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Value::Table(t) => match t.try_borrow() {
                Ok(t) => write!(f, "Table({:?})", t.array),
                Err(_) => write!(f, "Table(..)"),
            },
            Value::Handle(h) => write!(f, "Handle({}, {})", h.tag, h.index),
            Value::Function(h) => write!(f, "Function({})", h.index),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(_) | Value::Bytes(_), Value::String(_) | Value::Bytes(_)) => {
                self.as_bytes() == other.as_bytes()
            }
            // Tables compare by identity.
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Handle(a), Value::Handle(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::table(t)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Hashable table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKey {
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(Rc<str>),
}

impl TableKey {
    /// Key for a value; `None` for `nil`, NaN and reference values.
    pub fn from_value(value: &Value) -> Option<TableKey> {
        match value {
            Value::Bool(b) => Some(TableKey::Bool(*b)),
            Value::Number(n) if !n.is_nan() => Some(TableKey::Number(OrderedFloat(*n))),
            Value::String(s) => Some(TableKey::String(Rc::clone(s))),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            TableKey::Bool(b) => Value::Bool(*b),
            TableKey::Number(n) => Value::Number(n.0),
            TableKey::String(s) => Value::String(Rc::clone(s)),
        }
    }

    /// Array position for integral keys `>= 1`.
    fn array_index(&self) -> Option<usize> {
        match self {
            TableKey::Number(n) if n.0 >= 1.0 && n.0.fract() == 0.0 && n.0 <= usize::MAX as f64 => {
                Some(n.0 as usize)
            }
            _ => None,
        }
    }
}

impl From<&str> for TableKey {
    fn from(s: &str) -> Self {
        TableKey::String(Rc::from(s))
    }
}

impl From<usize> for TableKey {
    fn from(i: usize) -> Self {
        TableKey::Number(OrderedFloat(i as f64))
    }
}

/// A host table with an array part and a hash part.
///
/// Tables may carry a type tag; the binding tags the matrix records it
/// creates so they can be recognised as matrix objects.
#[derive(Debug, Clone, Default)]
pub struct Table {
    array: Vec<Value>,
    hash: FxHashMap<TableKey, Value>,
    tag: Option<TypeHash>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(tag: TypeHash) -> Self {
        Self {
            tag: Some(tag),
            ..Self::default()
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut table = Self::new();
        for value in values {
            table.push(value);
        }
        table
    }

    pub fn tag(&self) -> Option<TypeHash> {
        self.tag
    }

    pub fn set_tag(&mut self, tag: Option<TypeHash>) {
        self.tag = tag;
    }

    /// Length of the array part.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.hash.is_empty()
    }

    pub fn array(&self) -> &[Value] {
        &self.array
    }

    pub fn get(&self, key: &TableKey) -> Value {
        if let Some(i) = key.array_index()
            && i <= self.array.len()
        {
            return self.array[i - 1].clone();
        }
        self.hash.get(key).cloned().unwrap_or_default()
    }

    /// Set `key` to `value`; assigning `nil` removes the entry.
    pub fn set(&mut self, key: TableKey, value: Value) {
        match key.array_index() {
            Some(i) if i <= self.array.len() => {
                if value.is_nil() {
                    // Truncate the array part at the hole.
                    let tail = self.array.split_off(i - 1);
                    for (offset, v) in tail.into_iter().enumerate().skip(1) {
                        self.hash.insert(TableKey::from(i + offset), v);
                    }
                } else {
                    self.array[i - 1] = value;
                }
            }
            Some(i) if i == self.array.len() + 1 && !value.is_nil() => {
                self.array.push(value);
                self.migrate();
            }
            _ => {
                if value.is_nil() {
                    self.hash.remove(&key);
                } else {
                    self.hash.insert(key, value);
                }
            }
        }
    }

    /// Move entries that now continue the array part out of the hash part.
    fn migrate(&mut self) {
        while let Some(v) = self.hash.remove(&TableKey::from(self.array.len() + 1)) {
            self.array.push(v);
        }
    }

    pub fn push(&mut self, value: Value) {
        let key = TableKey::from(self.array.len() + 1);
        self.set(key, value);
    }

    /// Array element, 1-based.
    pub fn index(&self, i: usize) -> Value {
        self.get(&TableKey::from(i))
    }

    pub fn field(&self, name: &str) -> Value {
        self.get(&TableKey::from(name))
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) {
        self.set(TableKey::from(name), value.into());
    }

    /// Every entry, array part first.
    pub fn pairs(&self) -> Vec<(TableKey, Value)> {
        let array = self
            .array
            .iter()
            .enumerate()
            .map(|(i, v)| (TableKey::from(i + 1), v.clone()));
        array
            .chain(self.hash.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_part() {
        let mut t = Table::new();
        t.set(TableKey::from(2usize), Value::Number(2.0));
        assert_eq!(t.len(), 0);
        t.push(Value::Number(1.0));
        // Key 2 moved into the array part.
        assert_eq!(t.len(), 2);
        assert_eq!(t.index(2), Value::Number(2.0));
        t.set(TableKey::from(1usize), Value::Nil);
        assert_eq!(t.len(), 0);
        assert_eq!(t.index(2), Value::Number(2.0));
    }

    #[test]
    fn test_fields() {
        let mut t = Table::new();
        t.set_field("backward", true);
        assert_eq!(t.field("backward"), Value::Bool(true));
        assert!(t.field("missing").is_nil());
        t.set_field("backward", Value::Nil);
        assert!(t.is_empty());
    }

    #[test]
    fn test_value_equality() {
        let a = Value::list([Value::Number(1.0)]);
        let b = Value::list([Value::Number(1.0)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(Value::string("ab"), Value::bytes(b"ab"));
        assert!(!Value::Nil.truthy());
        assert!(Value::Number(0.0).truthy());
    }

    #[test]
    fn test_value_accessors() {
        let v = Value::numbers([1.0, 2.0, 3.0]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.index(3), Value::Number(3.0));
        assert!(v.get("x").is_nil());
        assert_eq!(Value::from("x").type_name(), "string");
    }
}
