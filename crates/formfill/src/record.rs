// File: src/record.rs
// Purpose: Flat key/value records exchanged with the population engine

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A submitted or serialized field value: a single scalar, or an
/// ordered list for multi-valued controls (multi-selects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Single(String),
    Many(Vec<String>),
}

impl Value {
    /// The scalar view of the value; `None` for lists.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Value::Single(value) => Some(value),
            Value::Many(_) => None,
        }
    }

    /// The list view of the value; `None` for scalars.
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Value::Single(_) => None,
            Value::Many(values) => Some(values),
        }
    }

    /// A zero-length scalar or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Single(value) => value.is_empty(),
            Value::Many(values) => values.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Single(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Single(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Single(value.to_string())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Single(value.to_string())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Single(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        // Locale-free rendering; whole numbers drop the trailing ".0".
        if value.fract() == 0.0 && value.is_finite() && value.abs() < i64::MAX as f64 {
            Value::Single(format!("{}", value as i64))
        } else {
            Value::Single(value.to_string())
        }
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::Many(values)
    }
}

impl From<&[&str]> for Value {
    fn from(values: &[&str]) -> Self {
        Value::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Value {
    fn from(values: [&str; N]) -> Self {
        Value::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// A flat record mapping field keys to values.
///
/// Keys are unique. Iteration follows insertion order, which is how the
/// serializer expresses tree traversal order on output; equality is
/// order-insensitive. Being a typed map, a record can never be the
/// "list-shaped input" the population contract rejects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    entries: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing entry for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(String, Value)> for Record {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, entries: I) {
        self.entries.extend(entries);
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
