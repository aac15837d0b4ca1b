//! Profile service: first-visit profile creation and role checks.

use chrono::Utc;
use haven_types::error::{ProfileError, RepositoryError};
use haven_types::profile::{DEFAULT_FULL_NAME, Profile, UserRole, display_name_from_email};
use tracing::{info, warn};
use uuid::Uuid;

use crate::profile::repository::ProfileRepository;

pub struct ProfileService<P: ProfileRepository> {
    repo: P,
}

impl<P: ProfileRepository> ProfileService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Return the user's profile, creating it on first visit.
    ///
    /// The display name comes from the email's local part. A concurrent
    /// first visit that loses the insert race re-reads the winner's row.
    pub async fn ensure_profile(
        &self,
        user_id: &Uuid,
        email: Option<&str>,
    ) -> Result<Profile, ProfileError> {
        if let Some(profile) = self.repo.get(user_id).await? {
            return Ok(profile);
        }

        let email = email.unwrap_or_default().trim().to_string();
        let full_name = if email.is_empty() {
            DEFAULT_FULL_NAME.to_string()
        } else {
            display_name_from_email(&email)
        };
        let profile = Profile {
            id: *user_id,
            email,
            full_name: Some(full_name),
            role: UserRole::User,
            created_at: Utc::now(),
        };

        match self.repo.create(&profile).await {
            Ok(created) => {
                info!(user_id = %user_id, "Profile created");
                Ok(created)
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(user_id = %user_id, "Profile created concurrently, reloading");
                self.repo.get(user_id).await?.ok_or(ProfileError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, user_id: &Uuid) -> Result<Profile, ProfileError> {
        self.repo.get(user_id).await?.ok_or(ProfileError::NotFound)
    }

    /// The caller's profile if it has the admin role.
    pub async fn require_admin(&self, user_id: &Uuid) -> Result<Profile, ProfileError> {
        match self.repo.get(user_id).await? {
            Some(profile) if profile.role == UserRole::Admin => Ok(profile),
            _ => Err(ProfileError::Forbidden),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>, ProfileError> {
        Ok(self.repo.list().await?)
    }

    pub async fn set_role(&self, user_id: &Uuid, role: UserRole) -> Result<(), ProfileError> {
        self.repo.set_role(user_id, role).await.map_err(not_found)?;
        info!(user_id = %user_id, role = %role, "Role changed");
        Ok(())
    }

    pub async fn delete_user(&self, user_id: &Uuid) -> Result<(), ProfileError> {
        self.repo.delete(user_id).await.map_err(not_found)?;
        info!(user_id = %user_id, "Profile deleted");
        Ok(())
    }
}

fn not_found(e: RepositoryError) -> ProfileError {
    match e {
        RepositoryError::NotFound => ProfileError::NotFound,
        other => ProfileError::Storage(other),
    }
}
