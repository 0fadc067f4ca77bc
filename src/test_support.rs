//! Shared fixtures for unit and integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::models::{CollectionName, Record};
use crate::remote::{DeleteSummary, RemoteError, RemoteOutcome, RemoteStore, UpsertSummary};

/// How upserts behave once recorded.
#[derive(Clone)]
enum UpsertMode {
    Immediate,
    /// Each upsert waits for one permit.
    Gated(Arc<Semaphore>),
    /// Upserts never resolve.
    Hanging,
}

/// Scriptable in-process remote store that records every call.
pub(crate) struct MockRemote {
    configured: bool,
    finds: Mutex<HashMap<CollectionName, RemoteOutcome<Vec<Record>>>>,
    find_calls: Mutex<Vec<CollectionName>>,
    upserts: Mutex<Vec<(CollectionName, String)>>,
    deletes: Mutex<Vec<(CollectionName, String)>>,
    failing_ids: Mutex<HashSet<String>>,
    mode: UpsertMode,
    /// Each delete waits for one permit when set.
    delete_gate: Option<Arc<Semaphore>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            configured: true,
            finds: Mutex::new(HashMap::new()),
            find_calls: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            failing_ids: Mutex::new(HashSet::new()),
            mode: UpsertMode::Immediate,
            delete_gate: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn hanging() -> Self {
        Self {
            mode: UpsertMode::Hanging,
            ..Self::new()
        }
    }

    /// Upserts block until permits are added to the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let remote = Self {
            mode: UpsertMode::Gated(gate.clone()),
            ..Self::new()
        };
        (remote, gate)
    }

    /// Deletes block until permits are added to the returned semaphore.
    pub fn gated_deletes() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let remote = Self {
            delete_gate: Some(gate.clone()),
            ..Self::new()
        };
        (remote, gate)
    }

    pub fn with_documents(self, collection: CollectionName, documents: Vec<Value>) -> Self {
        let records = documents.into_iter().filter_map(Record::from_value).collect();
        self.finds
            .lock()
            .insert(collection, RemoteOutcome::Done(records));
        self
    }

    pub fn with_find_failure(self, collection: CollectionName) -> Self {
        self.finds.lock().insert(
            collection,
            RemoteOutcome::Failed(RemoteError::Transport("connection refused".into())),
        );
        self
    }

    pub fn failing_on(self, id: &str) -> Self {
        self.failing_ids.lock().insert(id.to_string());
        self
    }

    pub fn find_calls(&self) -> Vec<CollectionName> {
        self.find_calls.lock().clone()
    }

    pub fn upserted_ids(&self, collection: CollectionName) -> Vec<String> {
        self.upserts
            .lock()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().len()
    }

    pub fn deleted_ids(&self, collection: CollectionName) -> Vec<String> {
        self.deletes
            .lock()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn find_all(&self, collection: CollectionName) -> RemoteOutcome<Vec<Record>> {
        if !self.configured {
            return RemoteOutcome::Unconfigured;
        }
        self.find_calls.lock().push(collection);
        self.finds
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or(RemoteOutcome::Done(Vec::new()))
    }

    async fn upsert_one(
        &self,
        collection: CollectionName,
        id: &str,
        _record: &Record,
    ) -> RemoteOutcome<UpsertSummary> {
        if !self.configured {
            return RemoteOutcome::Unconfigured;
        }
        self.upserts.lock().push((collection, id.to_string()));

        match &self.mode {
            UpsertMode::Immediate => {}
            UpsertMode::Gated(gate) => {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            UpsertMode::Hanging => std::future::pending::<()>().await,
        }

        if self.failing_ids.lock().contains(id) {
            return RemoteOutcome::Failed(RemoteError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        RemoteOutcome::Done(UpsertSummary {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        })
    }

    async fn delete_one(
        &self,
        collection: CollectionName,
        id: &str,
    ) -> RemoteOutcome<DeleteSummary> {
        if !self.configured {
            return RemoteOutcome::Unconfigured;
        }
        self.deletes.lock().push((collection, id.to_string()));

        if let Some(gate) = &self.delete_gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.failing_ids.lock().contains(id) {
            return RemoteOutcome::Failed(RemoteError::Transport("connection reset".into()));
        }
        RemoteOutcome::Done(DeleteSummary { deleted_count: 1 })
    }
}

/// Build records from JSON literals.
pub(crate) fn records(values: Vec<Value>) -> Vec<Record> {
    values.into_iter().filter_map(Record::from_value).collect()
}
