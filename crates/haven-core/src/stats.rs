//! Admin dashboard statistics.

use haven_types::error::RepositoryError;
use haven_types::stats::ChatStats;

use crate::chat::repository::ChatRepository;
use crate::counselor::repository::CounselorRepository;

/// Gather chat activity counts across all users.
pub async fn collect_chat_stats<C: ChatRepository, R: CounselorRepository>(
    chat_repo: &C,
    counselor_repo: &R,
) -> Result<ChatStats, RepositoryError> {
    let total_chats = chat_repo.count_sessions().await?;
    let total_messages = chat_repo.count_messages().await?;
    let active_users = chat_repo.count_ai_chat_users().await?;
    let active_counselors = counselor_repo.count_active().await?;

    Ok(ChatStats::from_counts(
        total_chats,
        total_messages,
        active_users,
        active_counselors,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::resolver::{ChatKind, SessionResolver};
    use crate::testing::{MemoryChatRepository, MemoryCounselorRepository, MemoryKv, counselor};
    use haven_types::identity::Identity;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_collect_counts_sessions_and_users() {
        let chat = MemoryChatRepository::default();
        let kv = MemoryKv::default();
        let dr = counselor("Dr. Rao", "Anxiety");
        let counselors = MemoryCounselorRepository::with(vec![dr.clone()]);
        let resolver = SessionResolver::new(&chat, &kv);

        let alice = Identity::User {
            id: Uuid::now_v7(),
            email: None,
        };
        let bob = Identity::User {
            id: Uuid::now_v7(),
            email: None,
        };
        resolver.resolve(&alice, ChatKind::Assistant, true).await.unwrap();
        resolver
            .resolve(&alice, ChatKind::Counselor(&dr), true)
            .await
            .unwrap();
        resolver
            .resolve(&bob, ChatKind::Counselor(&dr), true)
            .await
            .unwrap();

        let stats = collect_chat_stats(&chat, &counselors).await.unwrap();
        assert_eq!(stats.total_chats, 3);
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.average_messages_per_chat, 1);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.active_counselors, 1);
    }

    #[tokio::test]
    async fn test_collect_empty() {
        let stats = collect_chat_stats(
            &MemoryChatRepository::default(),
            &MemoryCounselorRepository::default(),
        )
        .await
        .unwrap();
        assert_eq!(stats, ChatStats::default());
    }
}
