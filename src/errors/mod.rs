//! Error handling module for the sync engine.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.
//! Remote store failures stay inside the sync and bootstrap layers as
//! [`crate::remote::RemoteError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_READY: &str = "NOT_READY";
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Unknown collection or record
    NotFound(String),
    /// Validation error
    Validation(String),
    /// Bootstrap has not signalled ready yet
    NotReady,
    /// Local settings storage error
    Persistence(String),
    /// Invalid configuration value
    Config(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::NotReady => codes::NOT_READY,
            AppError::Persistence(_) => codes::PERSISTENCE_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotReady => "State is still loading".to_string(),
            AppError::Persistence(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Settings storage error: {:?}", err);
        AppError::Persistence(format!("Settings storage error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub syncing: bool,
}

impl ErrorResponse {
    pub fn new(error: &AppError, syncing: bool) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
            },
            syncing,
        }
    }
}

/// Wrapper type for errors that carry the sync indicator.
pub struct AppErrorWithStatus {
    pub error: AppError,
    pub syncing: bool,
}

impl IntoResponse for AppErrorWithStatus {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.syncing);
        (status, Json(body)).into_response()
    }
}
