//! Sync status endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::sync::SyncStatusReport;
use crate::AppState;

/// GET /api/sync - Busy flags and counters per collection.
pub async fn get_sync_status(State(state): State<AppState>) -> ApiResult<SyncStatusReport> {
    let report = state.store.syncer().status();
    let syncing = report.syncing;
    success(report, syncing)
}
