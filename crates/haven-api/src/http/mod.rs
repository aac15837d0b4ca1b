//! HTTP/REST API layer for Haven.
//!
//! Axum-based REST API at `/api/v1/` with gateway-forwarded caller identity,
//! envelope response format, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
