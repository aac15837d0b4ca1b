//! Guest (unauthenticated) chat state.
//!
//! Guests have no identity and no persisted session. Their chat lives in the
//! ephemeral store under fixed keys, scoped to the client instance, and is
//! capped at [`MAX_GUEST_MESSAGES`] user-authored messages.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, SenderKind};

/// Maximum number of messages a guest may send before signing in.
pub const MAX_GUEST_MESSAGES: u32 = 5;

/// Ephemeral key holding the guest's AI chat message list.
pub const GUEST_CHAT_MESSAGES_KEY: &str = "guest_chat_messages";

/// Ephemeral key holding the guest's counselor chat message list.
pub const GUEST_COUNSELOR_MESSAGES_KEY: &str = "guest_counselor_messages";

/// Ephemeral key holding the counselor record a guest selected.
pub const GUEST_SELECTED_COUNSELOR_KEY: &str = "guest_selected_counselor";

/// Ephemeral key holding the anonymity preference for future sessions.
pub const ANONYMITY_PREFERENCE_KEY: &str = "anonymity_preference";

/// Sign-in entry point used for every forced redirect.
pub const LOGIN_PATH: &str = "/login";

/// Message shown on the sign-in page after the guest limit is hit.
pub const CONTINUE_CONVERSATION_MESSAGE: &str = "Please log in to continue your conversation.";

/// Client-local chat state for a guest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestState {
    pub messages: Vec<ChatMessage>,
    /// Number of user-authored messages in `messages`.
    pub sent_count: u32,
}

impl GuestState {
    /// Rebuild guest state from a stored message list.
    ///
    /// The counter is derived from the list rather than stored separately,
    /// so a tampered or stale counter can never undercount.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let sent_count = messages
            .iter()
            .filter(|m| m.sender == SenderKind::User)
            .count() as u32;
        Self {
            messages,
            sent_count,
        }
    }

    /// How many more messages the guest may send.
    pub fn remaining(&self) -> u32 {
        MAX_GUEST_MESSAGES.saturating_sub(self.sent_count)
    }

    /// Whether the guest has used up their allowance.
    pub fn is_exhausted(&self) -> bool {
        self.sent_count >= MAX_GUEST_MESSAGES
    }
}

/// Instruction to send the caller to the sign-in page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRedirect {
    /// Sign-in entry point (always [`LOGIN_PATH`]).
    pub path: String,
    /// Where to go after signing in.
    pub return_to: String,
    /// Human-readable explanation shown on the sign-in page.
    pub message: String,
}

impl AuthRedirect {
    /// Redirect to sign-in, returning to `return_to` afterwards.
    pub fn to_login(return_to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            return_to: return_to.into(),
            message: message.into(),
        }
    }
}
