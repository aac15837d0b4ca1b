//! Message store adapter.
//!
//! Appends a message to whichever backing the conversation lives in: the
//! chat repository for signed-in users, or the guest's list in the ephemeral
//! store. Each append gets a creation time strictly after the previous
//! message so ordering by time matches append order.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use haven_types::chat::{ChatMessage, ChatSession, SenderKind};
use haven_types::error::RepositoryError;
use haven_types::guest::GuestState;
use tracing::debug;

use crate::chat::guest::GuestStore;
use crate::chat::repository::ChatRepository;
use crate::storage::kv_store::KvStore;

/// Where a conversation's messages are kept.
#[derive(Debug, Clone)]
pub enum ChatTarget {
    /// Persisted session owned by a signed-in user.
    Session(ChatSession),
    /// Guest list stored under `key` in the ephemeral `scope`.
    Guest { scope: String, key: &'static str },
}

/// A resolved conversation and its messages in creation order.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub target: ChatTarget,
    pub messages: Vec<ChatMessage>,
    /// True when the resolver created the session on this call.
    pub created: bool,
}

impl Conversation {
    pub fn session(&self) -> Option<&ChatSession> {
        match &self.target {
            ChatTarget::Session(session) => Some(session),
            ChatTarget::Guest { .. } => None,
        }
    }

    /// Quota state for guest conversations; `None` for persisted sessions.
    pub fn guest_state(&self) -> Option<GuestState> {
        match self.target {
            ChatTarget::Guest { .. } => Some(GuestState::from_messages(self.messages.clone())),
            ChatTarget::Session(_) => None,
        }
    }
}

/// Creation time for a message appended after `previous`.
///
/// Stored timestamps keep microsecond precision, so the clock reading is
/// truncated first and then clamped to one microsecond past `previous`.
pub fn next_timestamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match previous {
        Some(prev) if prev >= now => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// Appends messages to persisted sessions or guest lists.
pub struct MessageStore<'a, C: ChatRepository, K: KvStore> {
    chat_repo: &'a C,
    kv: &'a K,
}

impl<'a, C: ChatRepository, K: KvStore> MessageStore<'a, C, K> {
    pub fn new(chat_repo: &'a C, kv: &'a K) -> Self {
        Self { chat_repo, kv }
    }

    /// Append a message to the conversation and return it.
    ///
    /// For guests the whole list is re-serialized, including any welcome
    /// message that was only seeded in memory.
    pub async fn append(
        &self,
        conversation: &mut Conversation,
        text: &str,
        sender: SenderKind,
    ) -> Result<ChatMessage, RepositoryError> {
        let created_at = next_timestamp(
            conversation.messages.last().map(|m| m.created_at),
            Utc::now(),
        );

        match &mut conversation.target {
            ChatTarget::Session(session) => {
                let message = ChatMessage::new(Some(session.id), text, sender, created_at);
                self.chat_repo.save_message(&message).await?;
                self.chat_repo.touch_session(&session.id, created_at).await?;
                session.last_message_at = created_at;
                debug!(session_id = %session.id, sender = %sender, "Message appended");
                conversation.messages.push(message.clone());
                Ok(message)
            }
            ChatTarget::Guest { scope, key } => {
                let message = ChatMessage::new(None, text, sender, created_at);
                conversation.messages.push(message.clone());
                GuestStore::new(self.kv)
                    .save_messages(scope, *key, &conversation.messages)
                    .await?;
                debug!(scope = %scope, sender = %sender, "Guest message appended");
                Ok(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryChatRepository, MemoryKv};
    use haven_types::guest::GUEST_CHAT_MESSAGES_KEY;
    use uuid::Uuid;

    fn session() -> ChatSession {
        let now = Utc::now();
        ChatSession {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            counselor_id: None,
            is_anonymous: true,
            title: None,
            created_at: now,
            last_message_at: now,
        }
    }

    #[test]
    fn test_next_timestamp_uses_clock_when_it_advances() {
        let prev = Utc::now() - TimeDelta::seconds(5);
        let now = Utc::now();
        assert_eq!(next_timestamp(Some(prev), now), now.trunc_subsecs(6));
        assert_eq!(next_timestamp(None, now), now.trunc_subsecs(6));
    }

    #[test]
    fn test_next_timestamp_clamps_when_clock_stalls() {
        let now = Utc::now().trunc_subsecs(6);
        assert_eq!(next_timestamp(Some(now), now), now + TimeDelta::microseconds(1));

        let ahead = now + TimeDelta::seconds(1);
        assert_eq!(
            next_timestamp(Some(ahead), now),
            ahead + TimeDelta::microseconds(1)
        );
    }

    #[tokio::test]
    async fn test_append_to_session_persists_and_touches() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let session = repo.create_session(&session()).await.unwrap();
        let mut conversation = Conversation {
            target: ChatTarget::Session(session.clone()),
            messages: Vec::new(),
            created: false,
        };

        let store = MessageStore::new(&repo, &kv);
        let first = store
            .append(&mut conversation, "one", SenderKind::User)
            .await
            .unwrap();
        let second = store
            .append(&mut conversation, "two", SenderKind::Ai)
            .await
            .unwrap();

        assert!(second.created_at > first.created_at);
        assert_eq!(first.session_id, Some(session.id));

        let stored = repo.get_messages(&session.id).await.unwrap();
        let texts: Vec<&str> = stored.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);

        let touched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(touched.last_message_at, second.created_at);
        assert!(kv.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_to_guest_reserializes_list() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let mut conversation = Conversation {
            target: ChatTarget::Guest {
                scope: "guest:abc".to_string(),
                key: GUEST_CHAT_MESSAGES_KEY,
            },
            messages: vec![ChatMessage::new(None, "welcome", SenderKind::Ai, Utc::now())],
            created: false,
        };

        let store = MessageStore::new(&repo, &kv);
        store
            .append(&mut conversation, "hello", SenderKind::User)
            .await
            .unwrap();

        let stored = GuestStore::new(&kv)
            .load_messages("guest:abc", GUEST_CHAT_MESSAGES_KEY)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].text, "welcome");
        assert_eq!(stored[1].sender, SenderKind::User);
        assert!(stored[1].session_id.is_none());
        assert_eq!(repo.count_messages().await.unwrap(), 0);
        assert_eq!(conversation.guest_state().unwrap().sent_count, 1);
    }
}
