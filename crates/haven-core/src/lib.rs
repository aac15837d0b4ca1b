//! Business logic and repository trait definitions for Haven.
//!
//! This crate defines the "ports" (repository and store traits) that the
//! infrastructure layer implements, plus the chat session logic built on them.
//! It depends only on `haven-types` -- never on `haven-infra` or any
//! database/IO crate.

pub mod chat;
pub mod counselor;
pub mod llm;
pub mod profile;
pub mod query;
pub mod stats;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
