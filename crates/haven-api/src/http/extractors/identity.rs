//! Caller identity extractors.
//!
//! Authentication happens in front of this server. The gateway forwards the
//! signed-in user as `X-User-Id` (UUID) and `X-User-Email`; anonymous browser
//! tabs identify themselves with a stable `X-Client-Id`, which scopes their
//! ephemeral guest state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use haven_types::guest::AuthRedirect;
use haven_types::identity::Identity;

use crate::http::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const SIGN_IN_MESSAGE: &str = "Please sign in to continue.";

/// Any caller: a signed-in user when `X-User-Id` is present, otherwise a guest.
pub struct Caller(pub Identity);

/// A signed-in user. Guests are rejected with a sign-in redirect.
pub struct SignedIn {
    pub id: Uuid,
    pub email: Option<String>,
}

/// The guest client id, whether or not the caller is also signed in.
pub struct GuestClient(pub String);

fn header(parts: &Parts, name: &str) -> Result<Option<String>, AppError> {
    match parts.headers.get(name) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AppError::Validation(format!("Invalid {name} header encoding")))?
                .trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        None => Ok(None),
    }
}

/// Resolve the caller from request headers.
pub fn identify(parts: &Parts) -> Result<Identity, AppError> {
    if let Some(raw) = header(parts, USER_ID_HEADER)? {
        let id = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::Validation(format!("Invalid X-User-Id: {raw}")))?;
        let email = header(parts, USER_EMAIL_HEADER)?;
        return Ok(Identity::User { id, email });
    }

    if let Some(client_id) = header(parts, CLIENT_ID_HEADER)? {
        return Ok(Identity::Guest { client_id });
    }

    Err(AppError::Unauthorized(
        "Missing caller identity. Provide 'X-User-Id' when signed in or 'X-Client-Id' as a guest."
            .to_string(),
    ))
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identify(parts).map(Caller)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sign_in = || {
            AppError::SignIn(AuthRedirect::to_login(parts.uri.path(), SIGN_IN_MESSAGE))
        };
        match identify(parts) {
            Ok(Identity::User { id, email }) => Ok(SignedIn { id, email }),
            Ok(Identity::Guest { .. }) | Err(AppError::Unauthorized(_)) => Err(sign_in()),
            Err(e) => Err(e),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for GuestClient {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(parts, CLIENT_ID_HEADER)?
            .map(GuestClient)
            .ok_or_else(|| AppError::Validation("Missing X-Client-Id header".to_string()))
    }
}
