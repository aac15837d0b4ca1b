//! Counselor directory types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A counselor listed in the directory.
///
/// Read-mostly reference data. Only active counselors are visible to users
/// and can be chatted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counselor {
    pub id: Uuid,
    pub full_name: String,
    /// Specialization tag (e.g., "Academic Stress", "Anxiety").
    pub specialization: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Linked user profile, when the counselor has a login.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Counselor {
    /// The greeting that seeds every new chat with this counselor.
    pub fn welcome_message(&self) -> String {
        format!(
            "Hello! I'm {}, a counselor specializing in {}. How can I help you today?",
            self.full_name, self.specialization
        )
    }

    /// Title given to new sessions with this counselor.
    pub fn session_title(&self) -> String {
        format!("Chat with {}", self.full_name)
    }
}

/// Fields accepted when creating or updating a counselor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounselorDraft {
    pub full_name: String,
    pub specialization: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counselor() -> Counselor {
        Counselor {
            id: Uuid::now_v7(),
            full_name: "Dr. Priya Sharma".to_string(),
            specialization: "Academic Stress".to_string(),
            bio: None,
            profile_image_url: None,
            years_experience: Some(8),
            rating: Some(4.8),
            is_active: true,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_welcome_message() {
        assert_eq!(
            counselor().welcome_message(),
            "Hello! I'm Dr. Priya Sharma, a counselor specializing in Academic Stress. How can I help you today?"
        );
    }

    #[test]
    fn test_session_title() {
        assert_eq!(counselor().session_title(), "Chat with Dr. Priya Sharma");
    }

    #[test]
    fn test_deserialize_defaults_active() {
        let json = format!(
            r#"{{"id":"{}","full_name":"A","specialization":"B","created_at":"2025-01-01T00:00:00Z"}}"#,
            Uuid::now_v7()
        );
        let parsed: Counselor = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_active);
        assert!(parsed.bio.is_none());
    }
}
