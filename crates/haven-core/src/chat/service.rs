//! Chat service orchestrating both chats.
//!
//! ChatService ties the resolver, message store, guest quota, anonymity
//! preference, and responders together. Each send follows the same path:
//! resolve the conversation, check the guest quota, append the user's
//! message, produce a reply, append the reply. The two appends are not
//! atomic; if the reply fails the user's message stays.

use haven_types::chat::{ChatMessage, ChatSession, SenderKind, SessionTranscript};
use haven_types::counselor::Counselor;
use haven_types::error::ChatError;
use haven_types::guest::{GuestState, MAX_GUEST_MESSAGES};
use haven_types::identity::Identity;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::anonymity::{AnonymityChange, AnonymityToggle};
use crate::chat::guest::{GuestQuotaTracker, GuestStore};
use crate::chat::repository::ChatRepository;
use crate::chat::resolver::{ChatKind, SessionResolver};
use crate::chat::responder::{
    AssistantResponder, HANDOVER_GREETING, HANDOVER_NOTICE, ReplyDelay,
    SIMULATED_COUNSELOR_REPLY, canned_response, find_option,
};
use crate::chat::store::{Conversation, MessageStore};
use crate::storage::kv_store::KvStore;

/// What the caller typed in the AI chat.
#[derive(Debug, Clone)]
pub enum AiInput {
    /// Free text.
    Text(String),
    /// One of the quick options, by id.
    Option(String),
}

/// Guest usage shown alongside guest chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuestQuota {
    pub sent: u32,
    pub remaining: u32,
    pub limit: u32,
}

impl From<&GuestState> for GuestQuota {
    fn from(state: &GuestState) -> Self {
        Self {
            sent: state.sent_count,
            remaining: state.remaining(),
            limit: MAX_GUEST_MESSAGES,
        }
    }
}

/// A conversation as shown when a chat is opened.
#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    /// `None` for guests.
    pub session: Option<ChatSession>,
    pub messages: Vec<ChatMessage>,
    pub is_anonymous: bool,
    /// True when this open created the session.
    pub created: bool,
    /// Quick options are offered until the first user message.
    pub show_options: bool,
    pub guest: Option<GuestQuota>,
}

/// Messages appended by one send, in order.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub session_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
    pub guest: Option<GuestQuota>,
}

impl SendOutcome {
    fn from_conversation(conversation: &Conversation, messages: Vec<ChatMessage>) -> Self {
        Self {
            session_id: conversation.session().map(|s| s.id),
            messages,
            guest: conversation.guest_state().as_ref().map(GuestQuota::from),
        }
    }
}

/// Orchestrates the AI chat and counselor chat for users and guests.
///
/// Generic over the chat repository, the ephemeral store, and the reply
/// delay so haven-core never depends on haven-infra.
pub struct ChatService<C: ChatRepository, K: KvStore, D: ReplyDelay> {
    chat_repo: C,
    kv: K,
    delay: D,
    assistant: AssistantResponder,
}

impl<C: ChatRepository, K: KvStore, D: ReplyDelay> ChatService<C, K, D> {
    pub fn new(chat_repo: C, kv: K, delay: D, assistant: AssistantResponder) -> Self {
        Self {
            chat_repo,
            kv,
            delay,
            assistant,
        }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    fn resolver(&self) -> SessionResolver<'_, C, K> {
        SessionResolver::new(&self.chat_repo, &self.kv)
    }

    fn store(&self) -> MessageStore<'_, C, K> {
        MessageStore::new(&self.chat_repo, &self.kv)
    }

    async fn open(&self, identity: &Identity, kind: ChatKind<'_>) -> Result<ChatView, ChatError> {
        let is_anonymous = self.anonymity(identity).await?;
        let conversation = self.resolver().resolve(identity, kind, is_anonymous).await?;

        let show_options = matches!(kind, ChatKind::Assistant)
            && !conversation
                .messages
                .iter()
                .any(|m| m.sender == SenderKind::User);

        Ok(ChatView {
            is_anonymous: conversation
                .session()
                .map(|s| s.is_anonymous)
                .unwrap_or(is_anonymous),
            guest: conversation.guest_state().as_ref().map(GuestQuota::from),
            created: conversation.created,
            show_options,
            session: conversation.session().cloned(),
            messages: conversation.messages,
        })
    }

    /// Open the AI chat.
    pub async fn open_ai_chat(&self, identity: &Identity) -> Result<ChatView, ChatError> {
        self.open(identity, ChatKind::Assistant).await
    }

    /// Open the chat with a counselor.
    pub async fn open_counselor_chat(
        &self,
        identity: &Identity,
        counselor: &Counselor,
    ) -> Result<ChatView, ChatError> {
        self.open(identity, ChatKind::Counselor(counselor)).await
    }

    /// Resolve the conversation and append the user's message, enforcing the
    /// guest quota first.
    async fn begin_send(
        &self,
        identity: &Identity,
        kind: ChatKind<'_>,
        text: &str,
    ) -> Result<(Conversation, ChatMessage), ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let is_anonymous = self.anonymity(identity).await?;
        let mut conversation = self.resolver().resolve(identity, kind, is_anonymous).await?;

        if let Some(state) = conversation.guest_state() {
            if let Err(redirect) = GuestQuotaTracker::check(&state) {
                info!(scope = %identity.scope(), "Guest message limit reached");
                return Err(ChatError::GuestLimitReached(redirect));
            }
        }

        let user_message = self
            .store()
            .append(&mut conversation, text, SenderKind::User)
            .await?;
        Ok((conversation, user_message))
    }

    /// Send a message in the AI chat and return the user message plus the reply.
    ///
    /// Quick options and messages matching an option's text get the canned
    /// answer without calling the assistant.
    pub async fn send_ai_message(
        &self,
        identity: &Identity,
        input: AiInput,
    ) -> Result<SendOutcome, ChatError> {
        let text = match input {
            AiInput::Text(text) => text,
            AiInput::Option(id) => find_option(&id)
                .map(|o| o.text.to_string())
                .ok_or(ChatError::UnknownOption(id))?,
        };

        let (mut conversation, user_message) =
            self.begin_send(identity, ChatKind::Assistant, &text).await?;

        let reply_text = match canned_response(&text) {
            Some(canned) => canned.to_string(),
            None => self.assistant.reply(&conversation.messages).await,
        };

        let reply = self
            .store()
            .append(&mut conversation, &reply_text, SenderKind::Ai)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to store assistant reply"))?;

        Ok(SendOutcome::from_conversation(
            &conversation,
            vec![user_message, reply],
        ))
    }

    /// Send a message to a counselor. The reply is the simulated
    /// acknowledgement, released after the configured delay.
    pub async fn send_counselor_message(
        &self,
        identity: &Identity,
        counselor: &Counselor,
        text: &str,
    ) -> Result<SendOutcome, ChatError> {
        let (mut conversation, user_message) = self
            .begin_send(identity, ChatKind::Counselor(counselor), text)
            .await?;

        self.delay.wait().await;

        let reply = self
            .store()
            .append(&mut conversation, SIMULATED_COUNSELOR_REPLY, SenderKind::Counselor)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to store counselor reply"))?;

        Ok(SendOutcome::from_conversation(
            &conversation,
            vec![user_message, reply],
        ))
    }

    /// Hand the AI chat over to a counselor: an AI notice, then after the
    /// delay a greeting from the wellness office. Does not count against
    /// the guest quota.
    pub async fn connect_counselor(&self, identity: &Identity) -> Result<SendOutcome, ChatError> {
        let is_anonymous = self.anonymity(identity).await?;
        let mut conversation = self
            .resolver()
            .resolve(identity, ChatKind::Assistant, is_anonymous)
            .await?;

        let notice = self
            .store()
            .append(&mut conversation, HANDOVER_NOTICE, SenderKind::Ai)
            .await?;

        self.delay.wait().await;

        let greeting = self
            .store()
            .append(&mut conversation, HANDOVER_GREETING, SenderKind::Counselor)
            .await?;

        info!(scope = %identity.scope(), "Counselor handover requested");
        Ok(SendOutcome::from_conversation(
            &conversation,
            vec![notice, greeting],
        ))
    }

    /// The caller's anonymity preference for sessions created from now on.
    pub async fn anonymity(&self, identity: &Identity) -> Result<bool, ChatError> {
        Ok(AnonymityToggle::new(&self.kv)
            .current(&identity.scope())
            .await?)
    }

    pub async fn toggle_anonymity(&self, identity: &Identity) -> Result<AnonymityChange, ChatError> {
        Ok(AnonymityToggle::new(&self.kv)
            .toggle(&identity.scope())
            .await?)
    }

    /// Remember a guest's chosen counselor. Signed-in users reach their
    /// counselor sessions directly, so nothing is stored for them.
    pub async fn select_counselor(
        &self,
        identity: &Identity,
        counselor: &Counselor,
    ) -> Result<(), ChatError> {
        if identity.is_guest() {
            GuestStore::new(&self.kv)
                .save_selected_counselor(&identity.scope(), counselor)
                .await?;
        }
        Ok(())
    }

    /// The counselor a guest picked earlier, if any.
    pub async fn selected_counselor(
        &self,
        identity: &Identity,
    ) -> Result<Option<Counselor>, ChatError> {
        if !identity.is_guest() {
            return Ok(None);
        }
        Ok(GuestStore::new(&self.kv)
            .load_selected_counselor(&identity.scope())
            .await?)
    }

    /// Discard everything kept for a guest client once its visitor has
    /// signed in as `user_id`. Guests cannot clear their own quota.
    pub async fn forget_guest(&self, user_id: &Uuid, client_id: &str) -> Result<(), ChatError> {
        let scope = Identity::Guest {
            client_id: client_id.to_string(),
        }
        .scope();
        GuestStore::new(&self.kv).clear(&scope).await?;
        info!(scope = %scope, user_id = %user_id, "Guest state handed over after sign-in");
        Ok(())
    }

    /// A user's chat history: every session with its messages, most recent first.
    pub async fn list_transcripts(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<SessionTranscript>, ChatError> {
        let sessions = self.chat_repo.list_sessions_for_user(user_id).await?;
        let mut transcripts = Vec::with_capacity(sessions.len());
        for session in sessions {
            let messages = self.chat_repo.get_messages(&session.id).await?;
            transcripts.push(SessionTranscript { session, messages });
        }
        Ok(transcripts)
    }

    /// Messages of one session, which must belong to `user_id`.
    pub async fn get_messages(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let session = self
            .chat_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;
        if session.user_id != *user_id {
            return Err(ChatError::Forbidden);
        }
        Ok(self.chat_repo.get_messages(session_id).await?)
    }
}
