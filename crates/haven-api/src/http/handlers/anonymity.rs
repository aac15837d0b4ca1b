//! Anonymity preference handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use haven_core::chat::anonymity::AnonymityChange;

use crate::http::error::AppError;
use crate::http::extractors::identity::Caller;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnonymityStatus {
    pub is_anonymous: bool,
}

/// GET /api/v1/anonymity
pub async fn get_anonymity(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<ApiResponse<AnonymityStatus>>, AppError> {
    let start = Instant::now();
    let is_anonymous = state.chat_service.anonymity(&identity).await?;

    Ok(Json(ApiResponse::timed(AnonymityStatus { is_anonymous }, start)))
}

/// POST /api/v1/anonymity - Flip the preference. Applies to sessions created afterwards.
pub async fn toggle_anonymity(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<ApiResponse<AnonymityChange>>, AppError> {
    let start = Instant::now();
    let change = state.chat_service.toggle_anonymity(&identity).await?;

    Ok(Json(ApiResponse::timed(change, start)))
}
