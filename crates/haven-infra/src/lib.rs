//! Infrastructure layer for Haven.
//!
//! Contains implementations of the repository and store traits defined in
//! `haven-core`: SQLite storage, the in-process ephemeral store for guest
//! state, the Gemini provider, and config/data-dir helpers.

pub mod config;
pub mod ephemeral;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
