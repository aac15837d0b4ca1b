//! Profile handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use haven_types::profile::Profile;

use crate::http::error::AppError;
use crate::http::extractors::identity::SignedIn;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/profile - The caller's profile, created on first visit.
pub async fn get_profile(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let start = Instant::now();
    let profile = state
        .profile_service
        .ensure_profile(&user.id, user.email.as_deref())
        .await?;

    Ok(Json(ApiResponse::timed(profile, start).with_link("self", "/api/v1/profile")))
}
