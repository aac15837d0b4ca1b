//! In-process `KvStore` backed by a concurrent map.

use std::sync::Arc;

use dashmap::DashMap;
use haven_core::storage::kv_store::KvStore;
use haven_types::error::RepositoryError;

/// Scope-keyed JSON store held in memory.
///
/// Cloning shares the underlying map, so one instance can be handed to every
/// service that needs it.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<(String, String), serde_json::Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored keys across all scopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(
        &self,
        scope: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self
            .entries
            .get(&(scope.to_string(), key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn set(
        &self,
        scope: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.entries
            .insert((scope.to_string(), key.to_string()), value.clone());
        Ok(())
    }

    async fn delete(&self, scope: &str, key: &str) -> Result<(), RepositoryError> {
        self.entries.remove(&(scope.to_string(), key.to_string()));
        Ok(())
    }

    async fn clear_scope(&self, scope: &str) -> Result<(), RepositoryError> {
        self.entries.retain(|(s, _), _| s != scope);
        Ok(())
    }
}
