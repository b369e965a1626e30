//! Event payloads and the field names instrumented backends fill in.

use std::fmt;

use serde_json::{Map, Value};

/// Field holding the query text of a `sql` event.
pub const SQL: &str = "sql";
/// Field holding the key (or keys) of a cache event.
pub const KEY: &str = "key";
/// Field marking a query event as a replay from an in-process memo.
pub const CACHED: &str = "cached";
/// Field stamped by [`Tagged`](crate::Tagged) with the emitting backend's id.
pub const BACKEND_ID: &str = "backend_id";
/// Field holding the label of a query (`SCHEMA`, `TRANSACTION`, ...).
pub const OPERATION_NAME: &str = "operation_name";

/// Key/value fields carried by an [`Event`](crate::Event).
///
/// Accessors are lenient: a missing field or a field of an unexpected type
/// reads as `None`, never as an error.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of a query event.
    pub fn sql(text: impl Into<String>) -> Self {
        Self::new().with(SQL, text.into())
    }

    /// Payload of a single-key cache event.
    pub fn key(key: impl Into<String>) -> Self {
        Self::new().with(KEY, key.into())
    }

    /// Payload of a batch cache event.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<Value> = keys.into_iter().map(|k| Value::String(k.into())).collect();
        Self::new().with(KEY, keys)
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn u64_field(&self, field: &str) -> Option<u64> {
        self.get(field).and_then(Value::as_u64)
    }

    /// The `key` field interpreted as a cache key.
    pub fn cache_key(&self) -> Option<Key> {
        self.get(KEY).and_then(Key::from_value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The key of a cache operation: one key, or an ordered batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Key {
    Single(String),
    Batch(Vec<String>),
}

impl Key {
    /// Reads a key from a payload value.
    ///
    /// Strings become [`Key::Single`], arrays become [`Key::Batch`] (only
    /// their string elements are kept). Anything else is not a key.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Key::Single(s.clone())),
            Value::Array(items) => Some(Key::Batch(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Returns true if `predicate` accepts the key, or any key of a batch.
    pub fn any(&self, mut predicate: impl FnMut(&str) -> bool) -> bool {
        match self {
            Key::Single(key) => predicate(key),
            Key::Batch(keys) => keys.iter().any(|k| predicate(k)),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Single(key) => f.write_str(key),
            Key::Batch(keys) => write!(f, "[{}]", keys.join(", ")),
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Single(key.to_owned())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Single(key)
    }
}
