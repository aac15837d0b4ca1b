//! Key-value store trait.
//!
//! Defines the interface for scope-keyed ephemeral storage. A scope is one
//! caller (a guest client instance or a signed-in user); keys inside a scope
//! are fixed constants such as `guest_chat_messages`.

use haven_types::error::RepositoryError;

/// Trait for scope-keyed ephemeral storage.
///
/// Stores arbitrary JSON values keyed by scope and string key. Values are
/// untyped here; callers map them through serde at the edge.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        scope: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        scope: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        scope: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Drop every key in a scope (e.g., when a guest signs in).
    fn clear_scope(
        &self,
        scope: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
