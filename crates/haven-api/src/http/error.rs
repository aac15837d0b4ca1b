//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use haven_types::error::{ChatError, CounselorError, ProfileError, QueryError, RepositoryError};
use haven_types::guest::AuthRedirect;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    Counselor(CounselorError),
    Query(QueryError),
    Profile(ProfileError),
    Storage(RepositoryError),
    /// A signed-in user is required; carries where to send the caller.
    SignIn(AuthRedirect),
    /// The request carries no usable caller identification.
    Unauthorized(String),
    Validation(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<CounselorError> for AppError {
    fn from(e: CounselorError) -> Self {
        AppError::Counselor(e)
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::Query(e)
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::Profile(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Storage(e)
    }
}

impl AppError {
    /// Status, error code, message and optional details for the envelope.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        let redirect = |r: &AuthRedirect| serde_json::to_value(r).ok();

        match self {
            AppError::Chat(ChatError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.message(), None)
            }
            AppError::Chat(ChatError::GuestLimitReached(r)) => {
                (StatusCode::FORBIDDEN, "GUEST_LIMIT_REACHED", r.message.clone(), redirect(r))
            }
            AppError::Chat(ChatError::CounselorNotFound)
            | AppError::Counselor(CounselorError::NotFound)
            | AppError::Query(QueryError::CounselorNotFound) => (
                StatusCode::NOT_FOUND,
                "COUNSELOR_NOT_FOUND",
                "Counselor not found".to_string(),
                None,
            ),
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Chat session not found".to_string(),
                None,
            ),
            AppError::Chat(ChatError::Forbidden) | AppError::Query(QueryError::Forbidden) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.message(), None)
            }
            AppError::Chat(ChatError::UnknownOption(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_OPTION", self.message(), None)
            }
            AppError::Counselor(CounselorError::Invalid(msg))
            | AppError::Query(QueryError::Validation(msg))
            | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Query(QueryError::NotFound) => (
                StatusCode::NOT_FOUND,
                "QUERY_NOT_FOUND",
                "Query not found".to_string(),
                None,
            ),
            AppError::Query(QueryError::SignInRequired(r)) | AppError::SignIn(r) => {
                (StatusCode::UNAUTHORIZED, "SIGN_IN_REQUIRED", r.message.clone(), redirect(r))
            }
            AppError::Profile(ProfileError::NotFound) => (
                StatusCode::NOT_FOUND,
                "PROFILE_NOT_FOUND",
                "Profile not found".to_string(),
                None,
            ),
            AppError::Profile(ProfileError::Forbidden) => {
                (StatusCode::FORBIDDEN, "ADMIN_REQUIRED", self.message(), None)
            }
            AppError::Chat(ChatError::Storage(_))
            | AppError::Counselor(CounselorError::Storage(_))
            | AppError::Query(QueryError::Storage(_))
            | AppError::Profile(ProfileError::Storage(_))
            | AppError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", self.message(), None)
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone(), None)
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Chat(e) => e.to_string(),
            AppError::Counselor(e) => e.to_string(),
            AppError::Query(e) => e.to_string(),
            AppError::Profile(e) => e.to_string(),
            AppError::Storage(e) => format!("storage error: {e}"),
            AppError::SignIn(r) => r.message.clone(),
            AppError::Unauthorized(msg) | AppError::Validation(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        (status, Json(ApiResponse::error(code, &message, details))).into_response()
    }
}
