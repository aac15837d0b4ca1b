//! Counselor directory handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use haven_types::counselor::Counselor;

use crate::http::error::AppError;
use crate::http::extractors::identity::Caller;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/counselors - Active counselors, by name.
pub async fn list_counselors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Counselor>>>, AppError> {
    let start = Instant::now();
    let counselors = state.counselor_service.list_active().await?;

    Ok(Json(
        ApiResponse::timed(counselors, start).with_link("self", "/api/v1/counselors"),
    ))
}

/// GET /api/v1/counselors/{id}
pub async fn get_counselor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Counselor>>, AppError> {
    let start = Instant::now();
    let counselor = state.counselor_service.get_active(&id).await?;

    Ok(Json(
        ApiResponse::timed(counselor, start)
            .with_link("self", &format!("/api/v1/counselors/{id}"))
            .with_link("chat", &format!("/api/v1/chat/counselors/{id}/open")),
    ))
}

/// POST /api/v1/counselors/{id}/select - Remember a guest's pick.
pub async fn select_counselor(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Counselor>>, AppError> {
    let start = Instant::now();
    let counselor = state.counselor_service.get_active(&id).await?;
    state
        .chat_service
        .select_counselor(&identity, &counselor)
        .await?;

    Ok(Json(ApiResponse::timed(counselor, start)))
}

/// GET /api/v1/counselors/selected - The guest's earlier pick, if any.
pub async fn selected_counselor(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<ApiResponse<Option<Counselor>>>, AppError> {
    let start = Instant::now();
    let counselor = state.chat_service.selected_counselor(&identity).await?;

    Ok(Json(ApiResponse::timed(counselor, start)))
}
