//! Chat sessions: the AI assistant chat and the counselor chat.
//!
//! Signed-in users get persisted sessions; guests keep their messages in the
//! ephemeral store under fixed keys and are capped at a handful of sends.

pub mod anonymity;
pub mod guest;
pub mod repository;
pub mod resolver;
pub mod responder;
pub mod service;
pub mod store;
