//! Guest chat state and the guest message quota.
//!
//! Guests have no account, so their messages live in the ephemeral store
//! under fixed keys inside their client scope. Stored values are untrusted
//! JSON: anything that does not parse is discarded with a warning.

use haven_types::chat::ChatMessage;
use haven_types::counselor::Counselor;
use haven_types::error::RepositoryError;
use haven_types::guest::{
    AuthRedirect, CONTINUE_CONVERSATION_MESSAGE, GUEST_SELECTED_COUNSELOR_KEY, GuestState,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::storage::kv_store::KvStore;

/// Where a guest lands after signing in from a chat.
pub const CHAT_RETURN_PATH: &str = "/chat";

/// Enforces the fixed guest send limit.
pub struct GuestQuotaTracker;

impl GuestQuotaTracker {
    /// Reject the next send once the guest has used every allowed message.
    pub fn check(state: &GuestState) -> Result<(), AuthRedirect> {
        if state.is_exhausted() {
            return Err(AuthRedirect::to_login(
                CHAT_RETURN_PATH,
                CONTINUE_CONVERSATION_MESSAGE,
            ));
        }
        Ok(())
    }
}

/// Typed view over the ephemeral store for one guest's chat state.
pub struct GuestStore<'a, K: KvStore> {
    kv: &'a K,
}

impl<'a, K: KvStore> GuestStore<'a, K> {
    pub fn new(kv: &'a K) -> Self {
        Self { kv }
    }

    pub async fn load_messages(
        &self,
        scope: &str,
        key: &str,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        Ok(self.load(scope, key).await?.unwrap_or_default())
    }

    pub async fn save_messages(
        &self,
        scope: &str,
        key: &str,
        messages: &[ChatMessage],
    ) -> Result<(), RepositoryError> {
        self.save(scope, key, messages).await
    }

    pub async fn load_selected_counselor(
        &self,
        scope: &str,
    ) -> Result<Option<Counselor>, RepositoryError> {
        self.load(scope, GUEST_SELECTED_COUNSELOR_KEY).await
    }

    pub async fn save_selected_counselor(
        &self,
        scope: &str,
        counselor: &Counselor,
    ) -> Result<(), RepositoryError> {
        self.save(scope, GUEST_SELECTED_COUNSELOR_KEY, counselor).await
    }

    /// Drop everything stored for this guest.
    pub async fn clear(&self, scope: &str) -> Result<(), RepositoryError> {
        self.kv.clear_scope(scope).await
    }

    async fn load<T: DeserializeOwned>(
        &self,
        scope: &str,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        let Some(value) = self.kv.get(scope, key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(scope, key, error = %e, "Discarding malformed guest state");
                self.kv.delete(scope, key).await?;
                Ok(None)
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(
        &self,
        scope: &str,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let json = serde_json::to_value(value)
            .map_err(|e| RepositoryError::Query(format!("failed to encode guest state: {e}")))?;
        self.kv.set(scope, key, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryKv, counselor};
    use chrono::Utc;
    use haven_types::chat::SenderKind;
    use haven_types::guest::{GUEST_CHAT_MESSAGES_KEY, MAX_GUEST_MESSAGES};

    #[test]
    fn test_quota_allows_until_cap() {
        let messages: Vec<ChatMessage> = (0..MAX_GUEST_MESSAGES - 1)
            .map(|_| ChatMessage::new(None, "hi", SenderKind::User, Utc::now()))
            .collect();
        assert!(GuestQuotaTracker::check(&GuestState::from_messages(messages)).is_ok());
    }

    #[test]
    fn test_quota_redirects_at_cap() {
        let messages: Vec<ChatMessage> = (0..MAX_GUEST_MESSAGES)
            .map(|_| ChatMessage::new(None, "hi", SenderKind::User, Utc::now()))
            .collect();
        let redirect = GuestQuotaTracker::check(&GuestState::from_messages(messages)).unwrap_err();
        assert_eq!(redirect.path, "/login");
        assert_eq!(redirect.return_to, "/chat");
        assert_eq!(redirect.message, "Please log in to continue your conversation.");
    }

    #[tokio::test]
    async fn test_messages_roundtrip_through_store() {
        let kv = MemoryKv::default();
        let store = GuestStore::new(&kv);
        let messages = vec![
            ChatMessage::new(None, "welcome", SenderKind::Ai, Utc::now()),
            ChatMessage::new(None, "hello", SenderKind::User, Utc::now()),
        ];

        store
            .save_messages("guest:a", GUEST_CHAT_MESSAGES_KEY, &messages)
            .await
            .unwrap();
        let loaded = store
            .load_messages("guest:a", GUEST_CHAT_MESSAGES_KEY)
            .await
            .unwrap();
        assert_eq!(loaded, messages);

        let other = store
            .load_messages("guest:b", GUEST_CHAT_MESSAGES_KEY)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_messages_are_discarded() {
        let kv = MemoryKv::default();
        kv.put_raw(
            "guest:a",
            GUEST_CHAT_MESSAGES_KEY,
            serde_json::json!([{"text": "no sender"}]),
        );

        let store = GuestStore::new(&kv);
        let loaded = store
            .load_messages("guest:a", GUEST_CHAT_MESSAGES_KEY)
            .await
            .unwrap();
        assert!(loaded.is_empty());
        assert!(kv.raw("guest:a", GUEST_CHAT_MESSAGES_KEY).is_none());
    }

    #[tokio::test]
    async fn test_selected_counselor_and_clear() {
        let kv = MemoryKv::default();
        let store = GuestStore::new(&kv);
        let chosen = counselor("Dr. Rao", "Anxiety");

        store.save_selected_counselor("guest:a", &chosen).await.unwrap();
        let loaded = store.load_selected_counselor("guest:a").await.unwrap();
        assert_eq!(loaded.map(|c| c.id), Some(chosen.id));

        store.clear("guest:a").await.unwrap();
        assert!(store.load_selected_counselor("guest:a").await.unwrap().is_none());
    }
}
