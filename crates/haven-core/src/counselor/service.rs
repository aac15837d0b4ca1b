//! Counselor directory service.

use chrono::Utc;
use haven_types::counselor::{Counselor, CounselorDraft};
use haven_types::error::{CounselorError, RepositoryError};
use tracing::info;
use uuid::Uuid;

use crate::counselor::repository::CounselorRepository;

/// Directory reads for students and management for admins.
pub struct CounselorService<R: CounselorRepository> {
    repo: R,
}

impl<R: CounselorRepository> CounselorService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Active counselors, as shown in the directory.
    pub async fn list_active(&self) -> Result<Vec<Counselor>, CounselorError> {
        Ok(self.repo.list(true).await?)
    }

    /// Every counselor, including deactivated ones (admin view).
    pub async fn list_all(&self) -> Result<Vec<Counselor>, CounselorError> {
        Ok(self.repo.list(false).await?)
    }

    /// An active counselor by id. Deactivated counselors are reported as not found.
    pub async fn get_active(&self, id: &Uuid) -> Result<Counselor, CounselorError> {
        match self.repo.get(id).await? {
            Some(counselor) if counselor.is_active => Ok(counselor),
            _ => Err(CounselorError::NotFound),
        }
    }

    pub async fn get(&self, id: &Uuid) -> Result<Counselor, CounselorError> {
        self.repo.get(id).await?.ok_or(CounselorError::NotFound)
    }

    pub async fn create(&self, draft: CounselorDraft) -> Result<Counselor, CounselorError> {
        let draft = validate(draft)?;
        let counselor = Counselor {
            id: Uuid::now_v7(),
            full_name: draft.full_name,
            specialization: draft.specialization,
            bio: draft.bio,
            profile_image_url: draft.profile_image_url,
            years_experience: draft.years_experience,
            rating: draft.rating,
            is_active: true,
            user_id: draft.user_id,
            created_at: Utc::now(),
        };
        let created = self.repo.create(&counselor).await?;
        info!(counselor_id = %created.id, name = %created.full_name, "Counselor created");
        Ok(created)
    }

    /// Replace a counselor's details. The active flag is left as is.
    pub async fn update(&self, id: &Uuid, draft: CounselorDraft) -> Result<Counselor, CounselorError> {
        let draft = validate(draft)?;
        let mut counselor = self.get(id).await?;
        counselor.full_name = draft.full_name;
        counselor.specialization = draft.specialization;
        counselor.bio = draft.bio;
        counselor.profile_image_url = draft.profile_image_url;
        counselor.years_experience = draft.years_experience;
        counselor.rating = draft.rating;
        counselor.user_id = draft.user_id;
        self.repo.update(&counselor).await?;
        info!(counselor_id = %id, "Counselor updated");
        Ok(counselor)
    }

    pub async fn set_active(&self, id: &Uuid, active: bool) -> Result<Counselor, CounselorError> {
        let mut counselor = self.get(id).await?;
        counselor.is_active = active;
        self.repo.update(&counselor).await?;
        info!(counselor_id = %id, active, "Counselor availability changed");
        Ok(counselor)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), CounselorError> {
        self.repo.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CounselorError::NotFound,
            other => CounselorError::Storage(other),
        })?;
        info!(counselor_id = %id, "Counselor deleted");
        Ok(())
    }

    pub async fn count_active(&self) -> Result<u64, CounselorError> {
        Ok(self.repo.count_active().await?)
    }
}

fn validate(mut draft: CounselorDraft) -> Result<CounselorDraft, CounselorError> {
    draft.full_name = draft.full_name.trim().to_string();
    draft.specialization = draft.specialization.trim().to_string();
    if draft.full_name.is_empty() {
        return Err(CounselorError::Invalid("full name is required".to_string()));
    }
    if draft.specialization.is_empty() {
        return Err(CounselorError::Invalid("specialization is required".to_string()));
    }
    if let Some(rating) = draft.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(CounselorError::Invalid(format!(
                "rating must be between 0 and 5, got {rating}"
            )));
        }
    }
    Ok(draft)
}
