//! Counselor query handlers.
//!
//! Endpoints:
//! - POST /api/v1/queries                   - Submit a query (guests get a sign-in redirect)
//! - GET  /api/v1/queries                   - The caller's queries with responses
//! - GET  /api/v1/queries/inbox             - Queries addressed to the caller's counselor record
//! - POST /api/v1/queries/{id}/responses    - Answer a query (addressed counselor or admin)
//! - POST /api/v1/queries/{id}/close        - Close a query (author only)

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use haven_types::query::{CounselorQuery, NewQuery, QueryResponse, QueryThread};

use crate::http::error::AppError;
use crate::http::extractors::identity::{Caller, SignedIn};
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub content: String,
}

/// POST /api/v1/queries
///
/// Takes any caller so the service can answer guests with the sign-in redirect.
pub async fn submit_query(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(body): Json<NewQuery>,
) -> Result<Json<ApiResponse<CounselorQuery>>, AppError> {
    let start = Instant::now();
    let query = state.query_service.submit(&identity, body).await?;
    let id = query.id;

    Ok(Json(
        ApiResponse::timed(query, start).with_link("responses", &format!("/api/v1/queries/{id}/responses")),
    ))
}

/// GET /api/v1/queries
pub async fn list_queries(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Vec<QueryThread>>>, AppError> {
    let start = Instant::now();
    let threads = state.query_service.list_for_user(&user.id).await?;

    Ok(Json(ApiResponse::timed(threads, start).with_link("self", "/api/v1/queries")))
}

/// GET /api/v1/queries/inbox
pub async fn inbox(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Vec<QueryThread>>>, AppError> {
    let start = Instant::now();
    let threads = state.query_service.inbox(&user.id).await?;

    Ok(Json(ApiResponse::timed(threads, start)))
}

/// POST /api/v1/queries/{id}/responses
pub async fn respond(
    State(state): State<AppState>,
    user: SignedIn,
    Path(query_id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<ApiResponse<QueryResponse>>, AppError> {
    let start = Instant::now();
    let responder = state
        .profile_service
        .ensure_profile(&user.id, user.email.as_deref())
        .await?;
    let response = state
        .query_service
        .respond(&responder, &query_id, &body.content)
        .await?;

    Ok(Json(ApiResponse::timed(response, start)))
}

/// POST /api/v1/queries/{id}/close
pub async fn close_query(
    State(state): State<AppState>,
    user: SignedIn,
    Path(query_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    state.query_service.close(&user.id, &query_id).await?;

    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "closed": true, "id": query_id }),
        start,
    )))
}
