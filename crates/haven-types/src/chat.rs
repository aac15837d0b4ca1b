//! Chat session and message types for Haven.
//!
//! A session ties a signed-in user to either the AI assistant
//! (`counselor_id == None`) or one specific counselor. Guests never get a
//! session row; their messages live in the ephemeral store instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who authored a chat message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `sender_type TEXT NOT NULL CHECK (sender_type IN ('user', 'ai', 'counselor'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    User,
    Ai,
    Counselor,
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderKind::User => write!(f, "user"),
            SenderKind::Ai => write!(f, "ai"),
            SenderKind::Counselor => write!(f, "counselor"),
        }
    }
}

impl FromStr for SenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(SenderKind::User),
            "ai" => Ok(SenderKind::Ai),
            "counselor" => Ok(SenderKind::Counselor),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A persisted conversation owned by a signed-in user.
///
/// Sessions are never closed; once created they stay active and are reused
/// for the same `(user_id, counselor_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` for the AI assistant chat.
    pub counselor_id: Option<Uuid>,
    /// When set, the counselor's view hides the user's identity.
    pub is_anonymous: bool,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

impl ChatSession {
    /// Whether this session is the AI assistant chat rather than a counselor chat.
    pub fn is_ai_chat(&self) -> bool {
        self.counselor_id.is_none()
    }
}

/// A single chat message.
///
/// Immutable once created. Within a session (or a guest list) messages are
/// ordered by `created_at`, which the message store keeps strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    /// Owning session; absent for guest messages held in the ephemeral store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub text: String,
    pub sender: SenderKind,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a new message with a fresh time-sortable id.
    pub fn new(
        session_id: Option<Uuid>,
        text: impl Into<String>,
        sender: SenderKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            text: text.into(),
            sender,
            created_at,
        }
    }
}

/// A session together with its messages (ascending), used for chat history views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_kind_roundtrip() {
        for sender in [SenderKind::User, SenderKind::Ai, SenderKind::Counselor] {
            let s = sender.to_string();
            let parsed: SenderKind = s.parse().unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_sender_kind_rejects_unknown() {
        let err = "model".parse::<SenderKind>().unwrap_err();
        assert!(err.contains("model"));
    }

    #[test]
    fn test_sender_kind_serde() {
        let json = serde_json::to_string(&SenderKind::Counselor).unwrap();
        assert_eq!(json, "\"counselor\"");
    }

    #[test]
    fn test_guest_message_omits_session_id() {
        let msg = ChatMessage::new(None, "hi", SenderKind::User, Utc::now());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("session_id"));

        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert!(parsed.session_id.is_none());
        assert_eq!(parsed.text, "hi");
    }

    #[test]
    fn test_is_ai_chat() {
        let now = Utc::now();
        let mut session = ChatSession {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            counselor_id: None,
            is_anonymous: true,
            title: None,
            created_at: now,
            last_message_at: now,
        };
        assert!(session.is_ai_chat());

        session.counselor_id = Some(Uuid::now_v7());
        assert!(!session.is_ai_chat());
    }
}
