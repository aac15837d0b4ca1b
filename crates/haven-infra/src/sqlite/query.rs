//! SQLite counselor query repository implementation.

use haven_core::query::repository::QueryRepository;
use haven_types::error::RepositoryError;
use haven_types::query::{CounselorQuery, QueryResponse, QueryStatus};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_error};

/// SQLite-backed implementation of `QueryRepository`.
#[derive(Clone)]
pub struct SqliteQueryRepository {
    pool: DatabasePool,
}

impl SqliteQueryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct QueryRow {
    id: String,
    user_id: String,
    counselor_id: String,
    subject: String,
    content: String,
    is_anonymous: bool,
    status: String,
    created_at: String,
}

impl QueryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            counselor_id: row.try_get("counselor_id")?,
            subject: row.try_get("subject")?,
            content: row.try_get("content")?,
            is_anonymous: row.try_get("is_anonymous")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_query(self) -> Result<CounselorQuery, RepositoryError> {
        let status: QueryStatus = self.status.parse().map_err(RepositoryError::Query)?;

        Ok(CounselorQuery {
            id: parse_uuid(&self.id, "query id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            counselor_id: parse_uuid(&self.counselor_id, "counselor_id")?,
            subject: self.subject,
            content: self.content,
            is_anonymous: self.is_anonymous,
            status,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct ResponseRow {
    id: String,
    query_id: String,
    responder_id: String,
    content: String,
    created_at: String,
}

impl ResponseRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            query_id: row.try_get("query_id")?,
            responder_id: row.try_get("responder_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_response(self) -> Result<QueryResponse, RepositoryError> {
        Ok(QueryResponse {
            id: parse_uuid(&self.id, "response id")?,
            query_id: parse_uuid(&self.query_id, "query_id")?,
            responder_id: parse_uuid(&self.responder_id, "responder_id")?,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn query_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CounselorQuery, RepositoryError> {
    QueryRow::from_row(row).map_err(query_error)?.into_query()
}

impl QueryRepository for SqliteQueryRepository {
    async fn create_query(&self, query: &CounselorQuery) -> Result<CounselorQuery, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO counselor_queries (id, user_id, counselor_id, subject, content, is_anonymous, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(query.id.to_string())
        .bind(query.user_id.to_string())
        .bind(query.counselor_id.to_string())
        .bind(&query.subject)
        .bind(&query.content)
        .bind(query.is_anonymous)
        .bind(query.status.to_string())
        .bind(format_datetime(&query.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(query.clone())
    }

    async fn get_query(&self, id: &Uuid) -> Result<Option<CounselorQuery>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM counselor_queries WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(query_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<CounselorQuery>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM counselor_queries WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(query_from_row).collect()
    }

    async fn list_for_counselor(
        &self,
        counselor_id: &Uuid,
    ) -> Result<Vec<CounselorQuery>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM counselor_queries WHERE counselor_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(counselor_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(query_from_row).collect()
    }

    async fn update_status(&self, id: &Uuid, status: QueryStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE counselor_queries SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn add_response(&self, response: &QueryResponse) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO query_responses (id, query_id, responder_id, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(response.id.to_string())
        .bind(response.query_id.to_string())
        .bind(response.responder_id.to_string())
        .bind(&response.content)
        .bind(format_datetime(&response.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list_responses(&self, query_id: &Uuid) -> Result<Vec<QueryResponse>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM query_responses WHERE query_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(query_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut responses = Vec::with_capacity(rows.len());
        for row in &rows {
            let response_row = ResponseRow::from_row(row).map_err(query_error)?;
            responses.push(response_row.into_response()?);
        }
        Ok(responses)
    }
}
