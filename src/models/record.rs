//! Record model: one opaque document inside a collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field every record is keyed on, locally and remotely.
pub const ID_FIELD: &str = "id";

/// An opaque document. Only the `id` field has meaning to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

/// Immutable snapshot of one collection, shared by reference.
pub type Collection = Arc<Vec<Record>>;

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value; non-objects are rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// The record id, if present as a non-empty string.
    pub fn id(&self) -> Option<&str> {
        self.str_field(ID_FIELD)
    }

    /// A string field, treating empty strings as absent.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Assign an id to a record that lacks one. Returns the id now on the record.
    pub fn ensure_id(&mut self) -> String {
        if let Some(id) = self.id() {
            return id.to_string();
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.0.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
