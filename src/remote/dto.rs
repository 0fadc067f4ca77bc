//! Wire types for the Data API actions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Record, ID_FIELD};

/// Field assigned by the remote store; immutable once written.
const REMOTE_KEY_FIELD: &str = "_id";

/// Envelope shared by every action: target plus action-specific fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionRequest<'a, B: Serialize> {
    pub data_source: &'a str,
    pub database: &'a str,
    pub collection: &'a str,
    #[serde(flatten)]
    pub body: B,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdFilter<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FindBody {
    pub filter: Map<String, Value>,
}

impl FindBody {
    pub fn all() -> Self {
        Self { filter: Map::new() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SetUpdate {
    #[serde(rename = "$set")]
    pub set: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertBody<'a> {
    pub filter: IdFilter<'a>,
    pub update: SetUpdate,
    pub upsert: bool,
}

impl<'a> UpsertBody<'a> {
    pub fn new(id: &'a str, record: &Record) -> Self {
        let mut set = record.fields().clone();
        set.remove(REMOTE_KEY_FIELD);
        set.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Self {
            filter: IdFilter { id },
            update: SetUpdate { set },
            upsert: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteBody<'a> {
    pub filter: IdFilter<'a>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    pub documents: Option<Vec<Value>>,
}

impl FindResponse {
    /// Non-object documents are dropped.
    pub fn into_records(self) -> Vec<Record> {
        self.documents
            .unwrap_or_default()
            .into_iter()
            .filter_map(Record::from_value)
            .collect()
    }
}

/// What an upsert did remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSummary {
    #[serde(default)]
    pub matched_count: u64,
    #[serde(default)]
    pub modified_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<Value>,
}

/// What a delete did remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    #[serde(default)]
    pub deleted_count: u64,
}
