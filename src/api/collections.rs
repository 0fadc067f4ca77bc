//! Collection API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CollectionName, Record};
use crate::AppState;

fn parse_collection(name: &str) -> Result<CollectionName, AppError> {
    CollectionName::parse(name)
        .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", name)))
}

/// GET /api/collections/:name - Current snapshot.
pub async fn get_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Record>> {
    let syncing = state.store.is_syncing();

    match parse_collection(&name) {
        Ok(collection) => success(state.store.get(collection).to_vec(), syncing),
        Err(e) => error(e, syncing),
    }
}

/// PUT /api/collections/:name - Replace the whole collection.
pub async fn replace_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(records): Json<Vec<Record>>,
) -> ApiResult<Vec<Record>> {
    let collection = match parse_collection(&name) {
        Ok(collection) => collection,
        Err(e) => return error(e, state.store.is_syncing()),
    };

    let mutation = state.store.replace(collection, records);
    success(mutation.snapshot.to_vec(), state.store.is_syncing())
}

/// POST /api/collections/:name/records - Insert or replace one record.
///
/// Records arriving without an id get a fresh one.
pub async fn upsert_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut record): Json<Record>,
) -> ApiResult<Record> {
    let collection = match parse_collection(&name) {
        Ok(collection) => collection,
        Err(e) => return error(e, state.store.is_syncing()),
    };

    record.ensure_id();
    state.store.upsert_record(collection, record.clone());
    success(record, state.store.is_syncing())
}

/// DELETE /api/collections/:name/records/:id - Remove one record.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<()> {
    let collection = match parse_collection(&name) {
        Ok(collection) => collection,
        Err(e) => return error(e, state.store.is_syncing()),
    };

    match state.store.remove_record(collection, &id) {
        Some(_) => success((), state.store.is_syncing()),
        None => error(
            AppError::NotFound(format!("Record {} not found in {}", id, collection)),
            state.store.is_syncing(),
        ),
    }
}
