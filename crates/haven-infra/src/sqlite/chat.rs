//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `haven-core` using sqlx with split read/write pools:
//! raw queries, private Row structs, reader for SELECTs and writer for mutations.

use chrono::{DateTime, Utc};
use haven_core::chat::repository::ChatRepository;
use haven_types::chat::{ChatMessage, ChatSession, SenderKind};
use haven_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    user_id: String,
    counselor_id: Option<String>,
    is_anonymous: bool,
    title: Option<String>,
    created_at: String,
    last_message_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            counselor_id: row.try_get("counselor_id")?,
            is_anonymous: row.try_get("is_anonymous")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            last_message_at: row.try_get("last_message_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        Ok(ChatSession {
            id: parse_uuid(&self.id, "session id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            counselor_id: self
                .counselor_id
                .as_deref()
                .map(|id| parse_uuid(id, "counselor_id"))
                .transpose()?,
            is_anonymous: self.is_anonymous,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            last_message_at: parse_datetime(&self.last_message_at)?,
        })
    }
}

struct ChatMessageRow {
    id: String,
    session_id: String,
    content: String,
    sender_type: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            content: row.try_get("content")?,
            sender_type: row.try_get("sender_type")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let sender: SenderKind = self
            .sender_type
            .parse()
            .map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id: parse_uuid(&self.id, "message id")?,
            session_id: Some(parse_uuid(&self.session_id, "session_id")?),
            text: self.content,
            sender,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn sessions_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatSession>, RepositoryError> {
    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        let session_row = ChatSessionRow::from_row(row).map_err(query_error)?;
        sessions.push(session_row.into_session()?);
    }
    Ok(sessions)
}

async fn count(pool: &sqlx::SqlitePool, sql: &str) -> Result<u64, RepositoryError> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .map_err(query_error)?;
    let count: i64 = row.try_get("cnt").map_err(query_error)?;
    Ok(count as u64)
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, counselor_id, is_anonymous, title, created_at, last_message_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.counselor_id.map(|id| id.to_string()))
        .bind(session.is_anonymous)
        .bind(&session.title)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.last_message_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(query_error)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn find_latest_session(
        &self,
        user_id: &Uuid,
        counselor_id: Option<&Uuid>,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        // `IS ?` matches NULL against NULL, which selects the AI chat.
        let row = sqlx::query(
            r#"SELECT * FROM chat_sessions
               WHERE user_id = ? AND counselor_id IS ?
               ORDER BY created_at DESC, id DESC
               LIMIT 1"#,
        )
        .bind(user_id.to_string())
        .bind(counselor_id.map(|id| id.to_string()))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(query_error)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY last_message_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        sessions_from_rows(&rows)
    }

    async fn touch_session(
        &self,
        session_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET last_message_at = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let session_id = message
            .session_id
            .ok_or_else(|| RepositoryError::Query("message has no session_id".to_string()))?;

        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, content, sender_type, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(session_id.to_string())
        .bind(&message.text)
        .bind(message.sender.to_string())
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        count(&self.pool.reader, "SELECT COUNT(*) AS cnt FROM chat_sessions").await
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        count(&self.pool.reader, "SELECT COUNT(*) AS cnt FROM chat_messages").await
    }

    async fn count_ai_chat_users(&self) -> Result<u64, RepositoryError> {
        count(
            &self.pool.reader,
            "SELECT COUNT(DISTINCT user_id) AS cnt FROM chat_sessions WHERE counselor_id IS NULL",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::counselor::SqliteCounselorRepository;
    use crate::sqlite::test_support::test_pool;
    use chrono::TimeDelta;
    use haven_core::counselor::repository::CounselorRepository;
    use haven_types::counselor::Counselor;

    fn make_session(user_id: Uuid, counselor_id: Option<Uuid>) -> ChatSession {
        let now = Utc::now();
        ChatSession {
            id: Uuid::now_v7(),
            user_id,
            counselor_id,
            is_anonymous: true,
            title: None,
            created_at: now,
            last_message_at: now,
        }
    }

    async fn make_counselor(pool: &DatabasePool) -> Counselor {
        let counselor = Counselor {
            id: Uuid::now_v7(),
            full_name: "Dr. Rao".to_string(),
            specialization: "Anxiety".to_string(),
            bio: None,
            profile_image_url: None,
            years_experience: None,
            rating: None,
            is_active: true,
            user_id: None,
            created_at: Utc::now(),
        };
        SqliteCounselorRepository::new(pool.clone())
            .create(&counselor)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let counselor = make_counselor(&pool).await;

        let mut session = make_session(Uuid::now_v7(), Some(counselor.id));
        session.title = Some("Chat with Dr. Rao".to_string());
        session.is_anonymous = false;
        repo.create_session(&session).await.unwrap();

        let fetched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.counselor_id, Some(counselor.id));
        assert_eq!(fetched.title.as_deref(), Some("Chat with Dr. Rao"));
        assert!(!fetched.is_anonymous);

        assert!(repo.get_session(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_latest_session_distinguishes_ai_chat() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let counselor = make_counselor(&pool).await;
        let user_id = Uuid::now_v7();

        let ai = make_session(user_id, None);
        repo.create_session(&ai).await.unwrap();
        let mut older = make_session(user_id, Some(counselor.id));
        older.created_at = Utc::now() - TimeDelta::hours(1);
        repo.create_session(&older).await.unwrap();
        let newer = make_session(user_id, Some(counselor.id));
        repo.create_session(&newer).await.unwrap();

        let found = repo.find_latest_session(&user_id, None).await.unwrap().unwrap();
        assert_eq!(found.id, ai.id);

        let found = repo
            .find_latest_session(&user_id, Some(&counselor.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);

        assert!(
            repo.find_latest_session(&Uuid::now_v7(), None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_save_and_get_messages_in_order() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let session = make_session(Uuid::now_v7(), None);
        repo.create_session(&session).await.unwrap();

        let base = Utc::now();
        // Inserted out of order; read back by created_at.
        let later = ChatMessage::new(
            Some(session.id),
            "reply",
            SenderKind::Ai,
            base + TimeDelta::microseconds(1),
        );
        let earlier = ChatMessage::new(Some(session.id), "hello", SenderKind::User, base);
        repo.save_message(&later).await.unwrap();
        repo.save_message(&earlier).await.unwrap();

        let messages = repo.get_messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].sender, SenderKind::User);
        assert_eq!(messages[1].sender, SenderKind::Ai);
        assert_eq!(messages[1].session_id, Some(session.id));
    }

    #[tokio::test]
    async fn test_save_message_requires_session() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool);

        let orphan = ChatMessage::new(None, "x", SenderKind::User, Utc::now());
        assert!(repo.save_message(&orphan).await.is_err());

        let dangling = ChatMessage::new(Some(Uuid::now_v7()), "x", SenderKind::User, Utc::now());
        assert!(repo.save_message(&dangling).await.is_err());
    }

    #[tokio::test]
    async fn test_sender_type_check_constraint() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let session = make_session(Uuid::now_v7(), None);
        repo.create_session(&session).await.unwrap();

        for sender in [SenderKind::User, SenderKind::Ai, SenderKind::Counselor] {
            let message = ChatMessage::new(Some(session.id), "hi", sender, Utc::now());
            repo.save_message(&message).await.unwrap();
        }

        let rejected = sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, content, sender_type, created_at)
               VALUES (?, ?, 'x', 'system', ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(session.id.to_string())
        .bind(format_datetime(&Utc::now()))
        .execute(&pool.writer)
        .await;
        assert!(rejected.is_err());
        assert_eq!(repo.get_messages(&session.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_touch_and_list_sessions() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let user_id = Uuid::now_v7();

        let first = make_session(user_id, None);
        repo.create_session(&first).await.unwrap();
        let second = make_session(user_id, None);
        repo.create_session(&second).await.unwrap();

        repo.touch_session(&first.id, Utc::now() + TimeDelta::minutes(5))
            .await
            .unwrap();

        let sessions = repo.list_sessions_for_user(&user_id).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);

        assert!(matches!(
            repo.touch_session(&Uuid::now_v7(), Utc::now()).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_counts() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let counselor = make_counselor(&pool).await;
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        for session in [
            make_session(alice, None),
            make_session(alice, None),
            make_session(bob, Some(counselor.id)),
        ] {
            repo.create_session(&session).await.unwrap();
            repo.save_message(&ChatMessage::new(
                Some(session.id),
                "hi",
                SenderKind::User,
                Utc::now(),
            ))
            .await
            .unwrap();
        }

        assert_eq!(repo.count_sessions().await.unwrap(), 3);
        assert_eq!(repo.count_messages().await.unwrap(), 3);
        assert_eq!(repo.count_ai_chat_users().await.unwrap(), 1);
    }
}
