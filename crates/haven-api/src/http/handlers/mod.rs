//! HTTP request handlers for the REST API.

pub mod admin;
pub mod anonymity;
pub mod chat;
pub mod counselor;
pub mod profile;
pub mod query;
pub mod session;
