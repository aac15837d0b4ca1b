//! SQLite counselor repository implementation.

use haven_core::counselor::repository::CounselorRepository;
use haven_types::counselor::Counselor;
use haven_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_error};

/// SQLite-backed implementation of `CounselorRepository`.
#[derive(Clone)]
pub struct SqliteCounselorRepository {
    pool: DatabasePool,
}

impl SqliteCounselorRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct CounselorRow {
    id: String,
    full_name: String,
    specialization: String,
    bio: Option<String>,
    profile_image_url: Option<String>,
    years_experience: Option<i64>,
    rating: Option<f64>,
    is_active: bool,
    user_id: Option<String>,
    created_at: String,
}

impl CounselorRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            specialization: row.try_get("specialization")?,
            bio: row.try_get("bio")?,
            profile_image_url: row.try_get("profile_image_url")?,
            years_experience: row.try_get("years_experience")?,
            rating: row.try_get("rating")?,
            is_active: row.try_get("is_active")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_counselor(self) -> Result<Counselor, RepositoryError> {
        let years_experience = self
            .years_experience
            .map(u32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid years_experience: {e}")))?;

        Ok(Counselor {
            id: parse_uuid(&self.id, "counselor id")?,
            full_name: self.full_name,
            specialization: self.specialization,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            years_experience,
            rating: self.rating.map(|r| r as f32),
            is_active: self.is_active,
            user_id: self
                .user_id
                .as_deref()
                .map(|id| parse_uuid(id, "user_id"))
                .transpose()?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn counselor_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Counselor, RepositoryError> {
    CounselorRow::from_row(row)
        .map_err(query_error)?
        .into_counselor()
}

impl CounselorRepository for SqliteCounselorRepository {
    async fn create(&self, counselor: &Counselor) -> Result<Counselor, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO counselors (id, full_name, specialization, bio, profile_image_url,
                                       years_experience, rating, is_active, user_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(counselor.id.to_string())
        .bind(&counselor.full_name)
        .bind(&counselor.specialization)
        .bind(&counselor.bio)
        .bind(&counselor.profile_image_url)
        .bind(counselor.years_experience.map(i64::from))
        .bind(counselor.rating.map(f64::from))
        .bind(counselor.is_active)
        .bind(counselor.user_id.map(|id| id.to_string()))
        .bind(format_datetime(&counselor.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(counselor.clone())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Counselor>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM counselors WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(counselor_from_row).transpose()
    }

    async fn get_by_user(&self, user_id: &Uuid) -> Result<Option<Counselor>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM counselors WHERE user_id = ? LIMIT 1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(counselor_from_row).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Counselor>, RepositoryError> {
        let sql = if active_only {
            "SELECT * FROM counselors WHERE is_active = 1 ORDER BY full_name ASC"
        } else {
            "SELECT * FROM counselors ORDER BY full_name ASC"
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(counselor_from_row).collect()
    }

    async fn update(&self, counselor: &Counselor) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE counselors
               SET full_name = ?, specialization = ?, bio = ?, profile_image_url = ?,
                   years_experience = ?, rating = ?, is_active = ?, user_id = ?
               WHERE id = ?"#,
        )
        .bind(&counselor.full_name)
        .bind(&counselor.specialization)
        .bind(&counselor.bio)
        .bind(&counselor.profile_image_url)
        .bind(counselor.years_experience.map(i64::from))
        .bind(counselor.rating.map(f64::from))
        .bind(counselor.is_active)
        .bind(counselor.user_id.map(|id| id.to_string()))
        .bind(counselor.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        // Sessions, messages and queries go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM counselors WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM counselors WHERE is_active = 1")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count as u64)
    }
}
