//! Admin handlers: dashboard stats, user management, counselor management.
//!
//! Every handler first checks that the caller's profile has the admin role.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use haven_core::stats::collect_chat_stats;
use haven_types::counselor::{Counselor, CounselorDraft};
use haven_types::profile::{Profile, UserRole};
use haven_types::stats::ChatStats;

use crate::http::error::AppError;
use crate::http::extractors::identity::SignedIn;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

async fn require_admin(state: &AppState, user: &SignedIn) -> Result<Profile, AppError> {
    Ok(state.profile_service.require_admin(&user.id).await?)
}

/// A user account linked from a counselor draft must already exist.
async fn check_linked_user(state: &AppState, linked: Option<Uuid>) -> Result<(), AppError> {
    if let Some(user_id) = linked {
        state.profile_service.get(&user_id).await?;
    }
    Ok(())
}

async fn promote_linked_user(state: &AppState, linked: Option<Uuid>) -> Result<(), AppError> {
    if let Some(user_id) = linked {
        state
            .profile_service
            .set_role(&user_id, UserRole::Counselor)
            .await?;
    }
    Ok(())
}

/// GET /api/v1/admin/stats
pub async fn get_stats(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<ChatStats>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let stats = collect_chat_stats(
        state.chat_service.chat_repo(),
        state.counselor_service.repo(),
    )
    .await?;

    Ok(Json(ApiResponse::timed(stats, start).with_link("self", "/api/v1/admin/stats")))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Vec<Profile>>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let users = state.profile_service.list_users().await?;
    Ok(Json(ApiResponse::timed(users, start)))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn set_user_role(
    State(state): State<AppState>,
    user: SignedIn,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    state.profile_service.set_role(&user_id, body.role).await?;
    let profile = state.profile_service.get(&user_id).await?;
    Ok(Json(ApiResponse::timed(profile, start)))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    user: SignedIn,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    if user_id == user.id {
        return Err(AppError::Validation(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    state.profile_service.delete_user(&user_id).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "deleted": true, "id": user_id }),
        start,
    )))
}

/// GET /api/v1/admin/counselors - All counselors, including inactive ones.
pub async fn list_counselors(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Vec<Counselor>>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let counselors = state.counselor_service.list_all().await?;
    Ok(Json(ApiResponse::timed(counselors, start)))
}

/// POST /api/v1/admin/counselors
///
/// When the draft links a user account, that user must exist and is
/// promoted to the counselor role.
pub async fn create_counselor(
    State(state): State<AppState>,
    user: SignedIn,
    Json(body): Json<CounselorDraft>,
) -> Result<Json<ApiResponse<Counselor>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let linked = body.user_id;
    check_linked_user(&state, linked).await?;

    let counselor = state.counselor_service.create(body).await?;
    promote_linked_user(&state, linked).await?;

    let id = counselor.id;
    Ok(Json(
        ApiResponse::timed(counselor, start).with_link("self", &format!("/api/v1/counselors/{id}")),
    ))
}

/// PUT /api/v1/admin/counselors/{id}
///
/// Linking a user account here promotes it the same way as on create.
pub async fn update_counselor(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
    Json(body): Json<CounselorDraft>,
) -> Result<Json<ApiResponse<Counselor>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let linked = body.user_id;
    check_linked_user(&state, linked).await?;

    let counselor = state.counselor_service.update(&id, body).await?;
    promote_linked_user(&state, linked).await?;
    Ok(Json(ApiResponse::timed(counselor, start)))
}

/// POST /api/v1/admin/counselors/{id}/active
pub async fn set_counselor_active(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
    Json(body): Json<ActiveRequest>,
) -> Result<Json<ApiResponse<Counselor>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    let counselor = state.counselor_service.set_active(&id, body.active).await?;
    Ok(Json(ApiResponse::timed(counselor, start)))
}

/// DELETE /api/v1/admin/counselors/{id} - Also removes that counselor's chats and queries.
pub async fn delete_counselor(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    require_admin(&state, &user).await?;

    state.counselor_service.delete(&id).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "deleted": true, "id": id }),
        start,
    )))
}
