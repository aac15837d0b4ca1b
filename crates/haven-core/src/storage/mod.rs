//! Storage abstractions for Haven.
//!
//! Defines the ephemeral key-value store used for guest chat state and
//! per-caller preferences. Implementations live in haven-infra.

pub mod kv_store;
