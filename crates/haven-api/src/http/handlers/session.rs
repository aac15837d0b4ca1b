//! Chat history handlers for signed-in users.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use haven_types::chat::{ChatMessage, SessionTranscript};

use crate::http::error::AppError;
use crate::http::extractors::identity::SignedIn;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/sessions - Every session of the caller with its messages.
pub async fn list_sessions(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Vec<SessionTranscript>>>, AppError> {
    let start = Instant::now();
    let transcripts = state.chat_service.list_transcripts(&user.id).await?;

    Ok(Json(
        ApiResponse::timed(transcripts, start).with_link("self", "/api/v1/sessions"),
    ))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn get_session_messages(
    State(state): State<AppState>,
    user: SignedIn,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let messages = state
        .chat_service
        .get_messages(&user.id, &session_id)
        .await?;

    Ok(Json(ApiResponse::timed(messages, start).with_link(
        "self",
        &format!("/api/v1/sessions/{session_id}/messages"),
    )))
}
