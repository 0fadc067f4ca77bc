//! Language preference endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::Language;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageBody {
    pub language: String,
}

/// GET /api/language
pub async fn get_language(State(state): State<AppState>) -> ApiResult<LanguageBody> {
    let language = state.store.language().as_str().to_string();
    success(LanguageBody { language }, state.store.is_syncing())
}

/// PUT /api/language
pub async fn set_language(
    State(state): State<AppState>,
    Json(body): Json<LanguageBody>,
) -> ApiResult<LanguageBody> {
    let syncing = state.store.is_syncing();

    let Some(language) = Language::parse(&body.language) else {
        return error(
            AppError::Validation("Language tag is required".to_string()),
            syncing,
        );
    };

    match state.store.set_language(language).await {
        Ok(()) => success(
            LanguageBody {
                language: state.store.language().as_str().to_string(),
            },
            syncing,
        ),
        Err(e) => error(e, syncing),
    }
}
