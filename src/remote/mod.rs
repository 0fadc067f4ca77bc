//! Remote document store port.
//!
//! Every operation is fail-soft: transport and decoding problems come back as
//! [`RemoteOutcome::Failed`] and an unconfigured store answers
//! [`RemoteOutcome::Unconfigured`] without touching the network. Outcomes are consumed by
//! the sync and bootstrap layers only.

mod data_api;
mod dto;

pub use data_api::*;
pub use dto::{DeleteSummary, UpsertSummary};

use async_trait::async_trait;

use crate::models::{CollectionName, Record};

/// Why a remote call did not produce a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Connection, TLS or timeout failure
    Transport(String),
    /// Endpoint answered with a non-success status
    Status { status: u16, body: String },
    /// Response body was not the expected JSON
    Decode(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "transport error: {}", msg),
            RemoteError::Status { status, body } => write!(f, "status {}: {}", status, body),
            RemoteError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Result of one remote operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome<T> {
    Done(T),
    /// No access credential; nothing was sent
    Unconfigured,
    Failed(RemoteError),
}

impl<T> RemoteOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, RemoteOutcome::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RemoteOutcome::Failed(_))
    }
}

impl RemoteOutcome<Vec<Record>> {
    /// Collapse to the fetched records; anything but success reads as empty.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            RemoteOutcome::Done(records) => records,
            RemoteOutcome::Unconfigured | RemoteOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// The three primitive operations the engine needs from a document store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether calls will reach the network at all.
    fn is_configured(&self) -> bool;

    /// All documents of a collection (empty filter).
    async fn find_all(&self, collection: CollectionName) -> RemoteOutcome<Vec<Record>>;

    /// Set-or-insert the document whose `id` equals `id`.
    async fn upsert_one(
        &self,
        collection: CollectionName,
        id: &str,
        record: &Record,
    ) -> RemoteOutcome<UpsertSummary>;

    /// Delete the document whose `id` equals `id`.
    async fn delete_one(&self, collection: CollectionName, id: &str)
        -> RemoteOutcome<DeleteSummary>;
}
