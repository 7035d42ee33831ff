//! Change events
//!
//! A UI layer reports every field edit as `{ target: { name, value } }`.
//! The same shape drives both plain changes and collection toggles.

use serde::{Deserialize, Serialize};

use crate::FieldValue;

/// The element an edit originated from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTarget {
    /// Field name
    pub name: String,
    /// New value (or the value to toggle)
    #[serde(default)]
    pub value: FieldValue,
}

/// A single field edit dispatched by the UI layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub target: EventTarget,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        ChangeEvent {
            target: EventTarget {
                name: name.into(),
                value: value.into(),
            },
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.target.name
    }

    #[inline]
    pub fn value(&self) -> &FieldValue {
        &self.target.value
    }

    /// Split into (name, value)
    pub fn into_parts(self) -> (String, FieldValue) {
        (self.target.name, self.target.value)
    }
}
