//! Shared domain types for Haven.
//!
//! This crate contains the domain types used across the Haven wellness portal:
//! chat sessions and messages, counselors, guest state, counselor queries,
//! profiles, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod counselor;
pub mod error;
pub mod guest;
pub mod identity;
pub mod llm;
pub mod profile;
pub mod query;
pub mod stats;
