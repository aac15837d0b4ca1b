//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};

/// Aggregate chat activity for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStats {
    pub total_chats: u64,
    pub total_messages: u64,
    /// Rounded to the nearest whole message; 0 when there are no chats.
    pub average_messages_per_chat: u64,
    /// Distinct users with at least one AI chat.
    pub active_users: u64,
    pub active_counselors: u64,
}

impl ChatStats {
    /// Assemble stats from raw counts, computing the rounded average.
    pub fn from_counts(
        total_chats: u64,
        total_messages: u64,
        active_users: u64,
        active_counselors: u64,
    ) -> Self {
        let average_messages_per_chat = if total_chats == 0 {
            0
        } else {
            (total_messages as f64 / total_chats as f64).round() as u64
        };
        Self {
            total_chats,
            total_messages,
            average_messages_per_chat,
            active_users,
            active_counselors,
        }
    }
}
