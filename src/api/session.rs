//! Session API endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::session::SessionState;
use crate::AppState;

/// GET /api/session - Who is logged in.
pub async fn get_session(State(state): State<AppState>) -> ApiResult<SessionState> {
    success(state.session.state(), state.store.is_syncing())
}

/// POST /api/session/login - Persist the user the login screen selected.
pub async fn login(State(state): State<AppState>, Json(user): Json<User>) -> ApiResult<SessionState> {
    let syncing = state.store.is_syncing();

    if user.id.trim().is_empty() {
        return error(AppError::Validation("User id is required".to_string()), syncing);
    }
    if user.role == Role::Admin && user.email.as_deref() != Some(state.config.admin_email.as_str())
    {
        return error(
            AppError::Validation("Administrator email does not match".to_string()),
            syncing,
        );
    }

    match state.session.login(user).await {
        Ok(()) => success(state.session.state(), syncing),
        Err(e) => error(e, syncing),
    }
}

/// POST /api/session/logout - Forget the persisted session.
pub async fn logout(State(state): State<AppState>) -> ApiResult<SessionState> {
    let syncing = state.store.is_syncing();

    match state.session.logout().await {
        Ok(()) => success(state.session.state(), syncing),
        Err(e) => error(e, syncing),
    }
}
