//! CounselorRepository trait definition.

use haven_types::counselor::Counselor;
use haven_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for counselor persistence.
///
/// Implementations live in haven-infra (e.g., `SqliteCounselorRepository`).
pub trait CounselorRepository: Send + Sync {
    /// Insert a new counselor.
    fn create(
        &self,
        counselor: &Counselor,
    ) -> impl std::future::Future<Output = Result<Counselor, RepositoryError>> + Send;

    /// Get a counselor by ID regardless of its active flag.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Counselor>, RepositoryError>> + Send;

    /// Get the counselor record linked to a portal user account.
    fn get_by_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Counselor>, RepositoryError>> + Send;

    /// List counselors ordered by full_name. `active_only` hides deactivated ones.
    fn list(
        &self,
        active_only: bool,
    ) -> impl std::future::Future<Output = Result<Vec<Counselor>, RepositoryError>> + Send;

    /// Replace all mutable fields of an existing counselor.
    fn update(
        &self,
        counselor: &Counselor,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a counselor. Returns `RepositoryError::NotFound` if it does not exist.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of counselors with is_active = true.
    fn count_active(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
