//! SQLite profile repository implementation.

use haven_core::profile::repository::ProfileRepository;
use haven_types::error::RepositoryError;
use haven_types::profile::{Profile, UserRole};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_error};

/// SQLite-backed implementation of `ProfileRepository`.
#[derive(Clone)]
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProfileRow {
    id: String,
    email: String,
    full_name: Option<String>,
    role: String,
    created_at: String,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_profile(self) -> Result<Profile, RepositoryError> {
        let role: UserRole = self.role.parse().map_err(RepositoryError::Query)?;
        Ok(Profile {
            id: parse_uuid(&self.id, "profile id")?,
            email: self.email,
            full_name: self.full_name,
            role,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, RepositoryError> {
    ProfileRow::from_row(row).map_err(query_error)?.into_profile()
}

impl ProfileRepository for SqliteProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO profiles (id, email, full_name, role, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(profile.id.to_string())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.to_string())
        .bind(format_datetime(&profile.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(profile.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("profile '{}' already exists", profile.id)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM profiles ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn set_role(&self, id: &Uuid, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE profiles SET role = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
