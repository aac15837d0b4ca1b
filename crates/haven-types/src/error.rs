use thiserror::Error;

use crate::guest::AuthRedirect;

/// Errors from repository operations (used by trait definitions in haven-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from chat operations (AI chat and counselor chat).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message text is empty")]
    EmptyMessage,

    #[error("guest message limit reached")]
    GuestLimitReached(AuthRedirect),

    #[error("counselor not found")]
    CounselorNotFound,

    #[error("chat session not found")]
    SessionNotFound,

    #[error("chat session belongs to another user")]
    Forbidden,

    #[error("unknown chat option: '{0}'")]
    UnknownOption(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from counselor directory operations.
#[derive(Debug, Error)]
pub enum CounselorError {
    #[error("counselor not found")]
    NotFound,

    #[error("invalid counselor: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from counselor query operations.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query not found")]
    NotFound,

    #[error("counselor not found")]
    CounselorNotFound,

    #[error("invalid query: {0}")]
    Validation(String),

    #[error("sign-in required")]
    SignInRequired(AuthRedirect),

    #[error("not allowed to respond to this query")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,

    #[error("admin role required")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
