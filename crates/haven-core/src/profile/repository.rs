//! ProfileRepository trait definition.

use haven_types::error::RepositoryError;
use haven_types::profile::{Profile, UserRole};
use uuid::Uuid;

/// Repository trait for user profiles.
///
/// Profile ids are the hosted auth provider's user ids; this trait never
/// generates them.
pub trait ProfileRepository: Send + Sync {
    fn create(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<Profile, RepositoryError>> + Send;

    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// All profiles, newest first.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Profile>, RepositoryError>> + Send;

    fn set_role(
        &self,
        id: &Uuid,
        role: UserRole,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a profile. Returns `RepositoryError::NotFound` if it does not exist.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
