//! Per-request mutable context.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Context threaded by value through every phase and handler.
///
/// Holds things like the authenticated identity, trace ids or feature flags.
/// A stage that wants to change it returns a whole new scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestScope {
    values: HashMap<String, Value>,
}

impl RequestScope {
    /// Fresh scope for a new request.
    pub fn init() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Decode a value into `T`. `None` when missing or of the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder form of [`RequestScope::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
