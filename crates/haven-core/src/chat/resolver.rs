//! Session resolver.
//!
//! Finds the conversation a caller should see when opening a chat: the
//! guest's stored list, the user's most recent session with the same
//! counselor (or the AI), or a freshly created session seeded with a
//! welcome message. Find-or-create is not atomic; two concurrent opens for
//! the same pair may both create a session.

use chrono::Utc;
use haven_types::chat::{ChatMessage, ChatSession, SenderKind};
use haven_types::counselor::Counselor;
use haven_types::error::RepositoryError;
use haven_types::guest::{GUEST_CHAT_MESSAGES_KEY, GUEST_COUNSELOR_MESSAGES_KEY};
use haven_types::identity::Identity;
use tracing::info;
use uuid::Uuid;

use crate::chat::guest::GuestStore;
use crate::chat::repository::ChatRepository;
use crate::chat::responder::AI_GREETING;
use crate::chat::store::{ChatTarget, Conversation, MessageStore, next_timestamp};
use crate::storage::kv_store::KvStore;

/// Which chat is being opened.
#[derive(Debug, Clone, Copy)]
pub enum ChatKind<'c> {
    Assistant,
    Counselor(&'c Counselor),
}

impl ChatKind<'_> {
    pub fn counselor_id(&self) -> Option<&Uuid> {
        match self {
            ChatKind::Assistant => None,
            ChatKind::Counselor(counselor) => Some(&counselor.id),
        }
    }

    /// Ephemeral key for the guest's list. Guests have a single counselor
    /// conversation regardless of which counselor they picked.
    pub fn guest_key(&self) -> &'static str {
        match self {
            ChatKind::Assistant => GUEST_CHAT_MESSAGES_KEY,
            ChatKind::Counselor(_) => GUEST_COUNSELOR_MESSAGES_KEY,
        }
    }

    fn welcome(&self) -> (String, SenderKind) {
        match self {
            ChatKind::Assistant => (AI_GREETING.to_string(), SenderKind::Ai),
            ChatKind::Counselor(counselor) => (counselor.welcome_message(), SenderKind::Counselor),
        }
    }

    fn title(&self) -> Option<String> {
        match self {
            ChatKind::Assistant => None,
            ChatKind::Counselor(counselor) => Some(counselor.session_title()),
        }
    }
}

/// Resolves the conversation for a caller and chat kind.
pub struct SessionResolver<'a, C: ChatRepository, K: KvStore> {
    chat_repo: &'a C,
    kv: &'a K,
}

impl<'a, C: ChatRepository, K: KvStore> SessionResolver<'a, C, K> {
    pub fn new(chat_repo: &'a C, kv: &'a K) -> Self {
        Self { chat_repo, kv }
    }

    /// Load or create the conversation.
    ///
    /// `is_anonymous` only applies when a new session is created; reused
    /// sessions keep the flag they were created with.
    pub async fn resolve(
        &self,
        identity: &Identity,
        kind: ChatKind<'_>,
        is_anonymous: bool,
    ) -> Result<Conversation, RepositoryError> {
        match identity {
            Identity::Guest { .. } => self.resolve_guest(identity.scope(), kind).await,
            Identity::User { id, .. } => self.resolve_user(id, kind, is_anonymous).await,
        }
    }

    async fn resolve_guest(
        &self,
        scope: String,
        kind: ChatKind<'_>,
    ) -> Result<Conversation, RepositoryError> {
        let key = kind.guest_key();
        let guest_store = GuestStore::new(self.kv);
        let mut messages = guest_store.load_messages(&scope, key).await?;

        if messages.is_empty() {
            let (text, sender) = kind.welcome();
            messages.push(ChatMessage::new(
                None,
                text,
                sender,
                next_timestamp(None, Utc::now()),
            ));
            // The counselor welcome is stored right away; the AI greeting
            // is written with the guest's first message.
            if let ChatKind::Counselor(_) = kind {
                guest_store.save_messages(&scope, key, &messages).await?;
            }
        }

        Ok(Conversation {
            target: ChatTarget::Guest { scope, key },
            messages,
            created: false,
        })
    }

    async fn resolve_user(
        &self,
        user_id: &Uuid,
        kind: ChatKind<'_>,
        is_anonymous: bool,
    ) -> Result<Conversation, RepositoryError> {
        let store = MessageStore::new(self.chat_repo, self.kv);

        let existing = self
            .chat_repo
            .find_latest_session(user_id, kind.counselor_id())
            .await?;

        let (session, created) = match existing {
            Some(session) => (session, false),
            None => {
                let now = Utc::now();
                let session = ChatSession {
                    id: Uuid::now_v7(),
                    user_id: *user_id,
                    counselor_id: kind.counselor_id().copied(),
                    is_anonymous,
                    title: kind.title(),
                    created_at: now,
                    last_message_at: now,
                };
                let session = self.chat_repo.create_session(&session).await?;
                info!(
                    session_id = %session.id,
                    user_id = %user_id,
                    counselor_id = ?session.counselor_id,
                    is_anonymous,
                    "Chat session created"
                );
                (session, true)
            }
        };

        let messages = if created {
            Vec::new()
        } else {
            self.chat_repo.get_messages(&session.id).await?
        };

        let mut conversation = Conversation {
            target: ChatTarget::Session(session),
            messages,
            created,
        };

        if conversation.messages.is_empty() {
            let (text, sender) = kind.welcome();
            store.append(&mut conversation, &text, sender).await?;
        }

        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryChatRepository, MemoryKv, counselor};

    fn user() -> Identity {
        Identity::User {
            id: Uuid::now_v7(),
            email: Some("student@vit.ac.in".to_string()),
        }
    }

    fn guest() -> Identity {
        Identity::Guest {
            client_id: "tab-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_counselor_session_seeded_with_one_welcome() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let resolver = SessionResolver::new(&repo, &kv);
        let dr = counselor("Dr. Priya Sharma", "Academic Stress");

        let conversation = resolver
            .resolve(&user(), ChatKind::Counselor(&dr), true)
            .await
            .unwrap();

        assert!(conversation.created);
        let session = conversation.session().unwrap();
        assert_eq!(session.counselor_id, Some(dr.id));
        assert_eq!(session.title.as_deref(), Some("Chat with Dr. Priya Sharma"));

        let stored = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].sender, SenderKind::Counselor);
        assert_eq!(stored[0].text, dr.welcome_message());
    }

    #[tokio::test]
    async fn test_reopen_reuses_session() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let resolver = SessionResolver::new(&repo, &kv);
        let dr = counselor("Dr. Rao", "Anxiety");
        let me = user();

        let first = resolver
            .resolve(&me, ChatKind::Counselor(&dr), true)
            .await
            .unwrap();
        let second = resolver
            .resolve(&me, ChatKind::Counselor(&dr), false)
            .await
            .unwrap();

        assert!(!second.created);
        assert_eq!(first.session().unwrap().id, second.session().unwrap().id);
        assert!(second.session().unwrap().is_anonymous);
        assert_eq!(second.messages.len(), 1);
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn test_ai_and_counselor_sessions_are_separate() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let resolver = SessionResolver::new(&repo, &kv);
        let dr = counselor("Dr. Rao", "Anxiety");
        let me = user();

        let ai = resolver.resolve(&me, ChatKind::Assistant, true).await.unwrap();
        let with_dr = resolver
            .resolve(&me, ChatKind::Counselor(&dr), true)
            .await
            .unwrap();

        assert_ne!(ai.session().unwrap().id, with_dr.session().unwrap().id);
        assert!(ai.session().unwrap().is_ai_chat());
        assert!(ai.session().unwrap().title.is_none());
        assert_eq!(ai.messages[0].sender, SenderKind::Ai);
        assert_eq!(ai.messages[0].text, AI_GREETING);
    }

    #[tokio::test]
    async fn test_empty_existing_session_gets_welcome() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let me = user();
        let now = Utc::now();
        let bare = ChatSession {
            id: Uuid::now_v7(),
            user_id: me.user_id().unwrap(),
            counselor_id: None,
            is_anonymous: true,
            title: None,
            created_at: now,
            last_message_at: now,
        };
        repo.create_session(&bare).await.unwrap();

        let conversation = SessionResolver::new(&repo, &kv)
            .resolve(&me, ChatKind::Assistant, true)
            .await
            .unwrap();

        assert!(!conversation.created);
        assert_eq!(conversation.session().unwrap().id, bare.id);
        assert_eq!(repo.get_messages(&bare.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_counselor_welcome_is_stored() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let dr = counselor("Dr. Rao", "Anxiety");
        let visitor = guest();

        let conversation = SessionResolver::new(&repo, &kv)
            .resolve(&visitor, ChatKind::Counselor(&dr), true)
            .await
            .unwrap();

        assert!(conversation.session().is_none());
        assert_eq!(conversation.messages.len(), 1);
        assert!(kv.raw(&visitor.scope(), GUEST_COUNSELOR_MESSAGES_KEY).is_some());
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_guest_ai_greeting_is_not_stored_until_first_send() {
        let repo = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let visitor = guest();

        let conversation = SessionResolver::new(&repo, &kv)
            .resolve(&visitor, ChatKind::Assistant, true)
            .await
            .unwrap();

        assert_eq!(conversation.messages[0].text, AI_GREETING);
        assert!(kv.raw(&visitor.scope(), GUEST_CHAT_MESSAGES_KEY).is_none());
        assert_eq!(conversation.guest_state().unwrap().sent_count, 0);
    }
}
