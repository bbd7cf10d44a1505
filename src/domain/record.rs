use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One marketplace listing as it flows through the pipeline. Fields evolve
/// as transformations run, so the shape stays a dynamic key/value map until
/// rows reach the database boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object; anything else is not a usable record.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                data: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn str_field(&self, key: &str) -> Result<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| EtlError::missing_field(key))
    }

    pub fn i64_field(&self, key: &str) -> Result<i64> {
        self.data
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| EtlError::missing_field(key))
    }

    pub fn f64_field(&self, key: &str) -> Result<f64> {
        self.data
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| EtlError::missing_field(key))
    }

    /// Nullable string field: JSON null and an absent key both read as None.
    pub fn opt_str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Identifier used in log lines; sellers and shippings have no `id`.
    pub fn display_id(&self) -> &str {
        self.opt_str_field("id").unwrap_or("<unknown>")
    }

    /// Canonical serialized form. The map is sorted by key, so two records
    /// with the same key/value pairs always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        Value::Object(self.data.clone().into_iter().collect()).to_string()
    }
}
