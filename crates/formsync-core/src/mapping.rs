//! Field mapping - the live name → value table backing a form
//!
//! Values are arbitrary JSON (scalar, object or sequence). Equality on
//! mappings and values is deep structural equality.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FormError, FormResult};

/// A single field value
pub type FieldValue = Value;

/// Mapping from field name to value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: Map<String, Value>,
}

impl FieldMapping {
    pub fn new() -> Self {
        FieldMapping::default()
    }

    /// Build a mapping from a JSON value, which must be an object
    pub fn from_value(value: Value) -> FormResult<Self> {
        match value {
            Value::Object(fields) => Ok(FieldMapping { fields }),
            other => Err(FormError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Get a field value; `None` means the field is undefined
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Check if a field is recognized
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert or replace a field value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Deep equality of a single field across two mappings.
    ///
    /// A field missing from both sides compares equal.
    pub fn field_eq(&self, other: &FieldMapping, name: &str) -> bool {
        self.get(name) == other.get(name)
    }

    /// Whether both mappings recognize exactly the same field names
    pub fn same_keys(&self, other: &FieldMapping) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains(k))
    }

    /// Shallow-merge `patch` into this mapping, restricted to recognized
    /// fields. Returns the names that were not recognized.
    pub fn patch_known(&mut self, patch: &FieldMapping) -> Vec<String> {
        let mut rejected = Vec::new();
        for (name, value) in patch.iter() {
            match self.fields.get_mut(name) {
                Some(slot) => *slot = value.clone(),
                None => rejected.push(name.clone()),
            }
        }
        rejected
    }
}

impl From<Map<String, Value>> for FieldMapping {
    fn from(fields: Map<String, Value>) -> Self {
        FieldMapping { fields }
    }
}

impl TryFrom<Value> for FieldMapping {
    type Error = FormError;

    fn try_from(value: Value) -> FormResult<Self> {
        FieldMapping::from_value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        FieldMapping {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FieldMapping {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
