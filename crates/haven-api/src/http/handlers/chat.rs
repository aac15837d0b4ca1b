//! Chat HTTP handlers: the AI assistant chat and counselor chats.
//!
//! Endpoints:
//! - GET    /api/v1/chat/ai/options                 - Quick options shown on a fresh AI chat
//! - POST   /api/v1/chat/ai/open                    - Open (or create) the AI chat
//! - POST   /api/v1/chat/ai/messages                - Send text or a quick option
//! - POST   /api/v1/chat/ai/connect                 - Hand the AI chat over to a counselor
//! - POST   /api/v1/chat/counselors/{id}/open       - Open (or create) a counselor chat
//! - POST   /api/v1/chat/counselors/{id}/messages   - Send a message to a counselor
//! - DELETE /api/v1/chat/guest                      - Hand a guest client's state over after sign-in

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use haven_core::chat::responder::{CHAT_OPTIONS, ChatOption};
use haven_core::chat::service::{AiInput, ChatView, SendOutcome};

use crate::http::error::AppError;
use crate::http::extractors::identity::{Caller, GuestClient, SignedIn};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for the AI chat. Exactly one of the two is expected;
/// `option_id` wins when both are sent.
#[derive(Debug, Deserialize)]
pub struct AiMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub option_id: Option<String>,
}

impl AiMessageRequest {
    fn into_input(self) -> Result<AiInput, AppError> {
        match (self.option_id, self.text) {
            (Some(id), _) => Ok(AiInput::Option(id)),
            (None, Some(text)) => Ok(AiInput::Text(text)),
            (None, None) => Err(AppError::Validation(
                "Provide either 'text' or 'option_id'".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CounselorMessageRequest {
    pub text: String,
}

/// GET /api/v1/chat/ai/options
pub async fn list_options() -> Json<ApiResponse<Vec<ChatOption>>> {
    Json(
        ApiResponse::timed(CHAT_OPTIONS.to_vec(), Instant::now())
            .with_link("send", "/api/v1/chat/ai/messages"),
    )
}

/// POST /api/v1/chat/ai/open
pub async fn open_ai_chat(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<ApiResponse<ChatView>>, AppError> {
    let start = Instant::now();
    let view = state.chat_service.open_ai_chat(&identity).await?;

    Ok(Json(
        ApiResponse::timed(view, start).with_link("messages", "/api/v1/chat/ai/messages"),
    ))
}

/// POST /api/v1/chat/ai/messages
pub async fn send_ai_message(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(body): Json<AiMessageRequest>,
) -> Result<Json<ApiResponse<SendOutcome>>, AppError> {
    let start = Instant::now();
    let input = body.into_input()?;
    let outcome = state.chat_service.send_ai_message(&identity, input).await?;

    Ok(Json(ApiResponse::timed(outcome, start)))
}

/// POST /api/v1/chat/ai/connect
pub async fn connect_counselor(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> Result<Json<ApiResponse<SendOutcome>>, AppError> {
    let start = Instant::now();
    let outcome = state.chat_service.connect_counselor(&identity).await?;

    Ok(Json(ApiResponse::timed(outcome, start)))
}

/// POST /api/v1/chat/counselors/{id}/open
pub async fn open_counselor_chat(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(counselor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChatView>>, AppError> {
    let start = Instant::now();
    let counselor = state.counselor_service.get_active(&counselor_id).await?;
    let view = state
        .chat_service
        .open_counselor_chat(&identity, &counselor)
        .await?;

    Ok(Json(ApiResponse::timed(view, start).with_link(
        "messages",
        &format!("/api/v1/chat/counselors/{counselor_id}/messages"),
    )))
}

/// POST /api/v1/chat/counselors/{id}/messages
///
/// Holds the response until the simulated counselor reply is released.
pub async fn send_counselor_message(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(counselor_id): Path<Uuid>,
    Json(body): Json<CounselorMessageRequest>,
) -> Result<Json<ApiResponse<SendOutcome>>, AppError> {
    let start = Instant::now();
    let counselor = state.counselor_service.get_active(&counselor_id).await?;
    let outcome = state
        .chat_service
        .send_counselor_message(&identity, &counselor, &body.text)
        .await?;

    Ok(Json(ApiResponse::timed(outcome, start)))
}

/// DELETE /api/v1/chat/guest
///
/// Only a signed-in caller may clear the guest state of its browser tab;
/// a guest on its own gets SIGN_IN_REQUIRED and keeps its quota.
pub async fn forget_guest(
    State(state): State<AppState>,
    user: SignedIn,
    GuestClient(client_id): GuestClient,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    state
        .chat_service
        .forget_guest(&user.id, &client_id)
        .await?;

    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "cleared": true }),
        start,
    )))
}
