//! Local JSON API for external collaborators.
//!
//! Reads come straight from the in-memory state; writes apply locally and return before
//! the remote mirror catches up. Every response carries the global `syncing` flag.

mod collections;
mod language;
mod ready;
mod session;
mod sync_status;

pub use collections::*;
pub use language::*;
pub use ready::*;
pub use session::*;
pub use sync_status::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub syncing: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, syncing: bool) -> Self {
        Self {
            success: true,
            data,
            syncing,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithStatus>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, syncing: bool) -> ApiResult<T> {
    Ok(ApiResponse::new(data, syncing))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, syncing: bool) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithStatus {
        error: err,
        syncing,
    })
}
