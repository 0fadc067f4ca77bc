//! Loading gate: API reads are undefined until bootstrap has signalled ready.

use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::{AppError, AppErrorWithStatus};
use crate::state::StateStore;

/// Answer `503 NOT_READY` until the store is ready, then pass through.
pub async fn ready_gate_layer(store: Arc<StateStore>, request: Request, next: Next) -> Response {
    if store.is_ready() {
        return next.run(request).await;
    }

    AppErrorWithStatus {
        error: AppError::NotReady,
        syncing: store.is_syncing(),
    }
    .into_response()
}
