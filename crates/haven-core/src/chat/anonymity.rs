//! Anonymity preference.
//!
//! A per-caller flag kept in the ephemeral store. It is read when a new
//! session is created and copied onto it; flipping it later never touches
//! sessions that already exist. Nothing server-side enforces it.

use haven_types::error::RepositoryError;
use haven_types::guest::ANONYMITY_PREFERENCE_KEY;
use serde::Serialize;
use tracing::{info, warn};

use crate::storage::kv_store::KvStore;

/// Result of flipping the preference, with the notice shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymityChange {
    pub is_anonymous: bool,
    pub title: &'static str,
    pub notice: &'static str,
}

impl AnonymityChange {
    fn new(is_anonymous: bool) -> Self {
        if is_anonymous {
            Self {
                is_anonymous,
                title: "Anonymity Enabled",
                notice: "Your identity will be hidden from counselors.",
            }
        } else {
            Self {
                is_anonymous,
                title: "Anonymity Disabled",
                notice: "Counselors will now be able to see your identity.",
            }
        }
    }
}

pub struct AnonymityToggle<'a, K: KvStore> {
    kv: &'a K,
}

impl<'a, K: KvStore> AnonymityToggle<'a, K> {
    pub fn new(kv: &'a K) -> Self {
        Self { kv }
    }

    /// Current preference for a scope. Defaults to anonymous.
    pub async fn current(&self, scope: &str) -> Result<bool, RepositoryError> {
        match self.kv.get(scope, ANONYMITY_PREFERENCE_KEY).await? {
            None => Ok(true),
            Some(serde_json::Value::Bool(flag)) => Ok(flag),
            Some(other) => {
                warn!(scope, value = %other, "Ignoring malformed anonymity preference");
                Ok(true)
            }
        }
    }

    pub async fn toggle(&self, scope: &str) -> Result<AnonymityChange, RepositoryError> {
        let next = !self.current(scope).await?;
        self.kv
            .set(scope, ANONYMITY_PREFERENCE_KEY, &serde_json::Value::Bool(next))
            .await?;
        info!(scope, is_anonymous = next, "Anonymity preference changed");
        Ok(AnonymityChange::new(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryKv;

    #[tokio::test]
    async fn test_defaults_to_anonymous() {
        let kv = MemoryKv::default();
        assert!(AnonymityToggle::new(&kv).current("user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_flips_and_reports() {
        let kv = MemoryKv::default();
        let toggle = AnonymityToggle::new(&kv);

        let change = toggle.toggle("user:1").await.unwrap();
        assert!(!change.is_anonymous);
        assert_eq!(change.title, "Anonymity Disabled");
        assert!(!toggle.current("user:1").await.unwrap());

        let change = toggle.toggle("user:1").await.unwrap();
        assert!(change.is_anonymous);
        assert_eq!(change.notice, "Your identity will be hidden from counselors.");

        assert!(toggle.current("user:2").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_value_falls_back() {
        let kv = MemoryKv::default();
        kv.put_raw("user:1", ANONYMITY_PREFERENCE_KEY, serde_json::json!("yes"));
        assert!(AnonymityToggle::new(&kv).current("user:1").await.unwrap());
    }
}
