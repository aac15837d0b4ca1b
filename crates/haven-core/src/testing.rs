//! In-memory repository doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use haven_types::chat::{ChatMessage, ChatSession};
use haven_types::counselor::Counselor;
use haven_types::error::RepositoryError;
use haven_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use haven_types::profile::{Profile, UserRole};
use haven_types::query::{CounselorQuery, QueryResponse, QueryStatus};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::counselor::repository::CounselorRepository;
use crate::llm::provider::LlmProvider;
use crate::profile::repository::ProfileRepository;
use crate::query::repository::QueryRepository;
use crate::storage::kv_store::KvStore;

pub fn counselor(name: &str, specialization: &str) -> Counselor {
    Counselor {
        id: Uuid::now_v7(),
        full_name: name.to_string(),
        specialization: specialization.to_string(),
        bio: None,
        profile_image_url: None,
        years_experience: Some(5),
        rating: Some(4.5),
        is_active: true,
        user_id: None,
        created_at: Utc::now(),
    }
}

// --- Chat ---

#[derive(Default, Clone)]
pub struct MemoryChatRepository {
    pub sessions: Arc<Mutex<Vec<ChatSession>>>,
    pub messages: Arc<Mutex<Vec<ChatMessage>>>,
    /// When set, save_message fails for messages with this text.
    pub fail_on_text: Arc<Mutex<Option<String>>>,
}

impl MemoryChatRepository {
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl ChatRepository for MemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == *session_id)
            .cloned())
    }

    async fn find_latest_session(
        &self,
        user_id: &Uuid,
        counselor_id: Option<&Uuid>,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == *user_id && s.counselor_id.as_ref() == counselor_id)
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(sessions)
    }

    async fn touch_session(
        &self,
        session_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == *session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.last_message_at = at;
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        if self.fail_on_text.lock().unwrap().as_deref() == Some(message.text.as_str()) {
            return Err(RepositoryError::Query("insert failed".to_string()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == Some(*session_id))
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.messages.lock().unwrap().len() as u64)
    }

    async fn count_ai_chat_users(&self) -> Result<u64, RepositoryError> {
        let mut users: Vec<Uuid> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.counselor_id.is_none())
            .map(|s| s.user_id)
            .collect();
        users.sort();
        users.dedup();
        Ok(users.len() as u64)
    }
}

// --- Ephemeral store ---

#[derive(Default, Clone)]
pub struct MemoryKv {
    pub entries: Arc<Mutex<HashMap<(String, String), serde_json::Value>>>,
}

impl MemoryKv {
    pub fn put_raw(&self, scope: &str, key: &str, value: serde_json::Value) {
        self.entries
            .lock()
            .unwrap()
            .insert((scope.to_string(), key.to_string()), value);
    }

    pub fn raw(&self, scope: &str, key: &str) -> Option<serde_json::Value> {
        self.entries
            .lock()
            .unwrap()
            .get(&(scope.to_string(), key.to_string()))
            .cloned()
    }
}

impl KvStore for MemoryKv {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.raw(scope, key))
    }

    async fn set(
        &self,
        scope: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.put_raw(scope, key, value.clone());
        Ok(())
    }

    async fn delete(&self, scope: &str, key: &str) -> Result<(), RepositoryError> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(scope.to_string(), key.to_string()));
        Ok(())
    }

    async fn clear_scope(&self, scope: &str) -> Result<(), RepositoryError> {
        self.entries.lock().unwrap().retain(|(s, _), _| s != scope);
        Ok(())
    }
}

// --- Counselors ---

#[derive(Default, Clone)]
pub struct MemoryCounselorRepository {
    pub counselors: Arc<Mutex<Vec<Counselor>>>,
}

impl MemoryCounselorRepository {
    pub fn with(counselors: Vec<Counselor>) -> Self {
        Self {
            counselors: Arc::new(Mutex::new(counselors)),
        }
    }
}

impl CounselorRepository for MemoryCounselorRepository {
    async fn create(&self, counselor: &Counselor) -> Result<Counselor, RepositoryError> {
        self.counselors.lock().unwrap().push(counselor.clone());
        Ok(counselor.clone())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Counselor>, RepositoryError> {
        Ok(self
            .counselors
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *id)
            .cloned())
    }

    async fn get_by_user(&self, user_id: &Uuid) -> Result<Option<Counselor>, RepositoryError> {
        Ok(self
            .counselors
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == Some(*user_id))
            .cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Counselor>, RepositoryError> {
        let mut list: Vec<Counselor> = self
            .counselors
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(list)
    }

    async fn update(&self, counselor: &Counselor) -> Result<(), RepositoryError> {
        let mut list = self.counselors.lock().unwrap();
        let existing = list
            .iter_mut()
            .find(|c| c.id == counselor.id)
            .ok_or(RepositoryError::NotFound)?;
        *existing = counselor.clone();
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut list = self.counselors.lock().unwrap();
        let before = list.len();
        list.retain(|c| c.id != *id);
        if list.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .counselors
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .count() as u64)
    }
}

// --- Queries ---

#[derive(Default, Clone)]
pub struct MemoryQueryRepository {
    pub queries: Arc<Mutex<Vec<CounselorQuery>>>,
    pub responses: Arc<Mutex<Vec<QueryResponse>>>,
}

impl QueryRepository for MemoryQueryRepository {
    async fn create_query(&self, query: &CounselorQuery) -> Result<CounselorQuery, RepositoryError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(query.clone())
    }

    async fn get_query(&self, id: &Uuid) -> Result<Option<CounselorQuery>, RepositoryError> {
        Ok(self
            .queries
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == *id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<CounselorQuery>, RepositoryError> {
        let mut list: Vec<CounselorQuery> = self
            .queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.user_id == *user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn list_for_counselor(
        &self,
        counselor_id: &Uuid,
    ) -> Result<Vec<CounselorQuery>, RepositoryError> {
        let mut list: Vec<CounselorQuery> = self
            .queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.counselor_id == *counselor_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn update_status(&self, id: &Uuid, status: QueryStatus) -> Result<(), RepositoryError> {
        let mut list = self.queries.lock().unwrap();
        let query = list
            .iter_mut()
            .find(|q| q.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        query.status = status;
        Ok(())
    }

    async fn add_response(&self, response: &QueryResponse) -> Result<(), RepositoryError> {
        self.responses.lock().unwrap().push(response.clone());
        Ok(())
    }

    async fn list_responses(&self, query_id: &Uuid) -> Result<Vec<QueryResponse>, RepositoryError> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.query_id == *query_id)
            .cloned()
            .collect())
    }
}

// --- Profiles ---

#[derive(Default, Clone)]
pub struct MemoryProfileRepository {
    pub profiles: Arc<Mutex<Vec<Profile>>>,
}

impl ProfileRepository for MemoryProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut list = self.profiles.lock().unwrap();
        if list.iter().any(|p| p.id == profile.id) {
            return Err(RepositoryError::Conflict(profile.id.to_string()));
        }
        list.push(profile.clone());
        Ok(profile.clone())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == *id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let mut list = self.profiles.lock().unwrap().clone();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn set_role(&self, id: &Uuid, role: UserRole) -> Result<(), RepositoryError> {
        let mut list = self.profiles.lock().unwrap();
        let profile = list
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        profile.role = role;
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut list = self.profiles.lock().unwrap();
        let before = list.len();
        list.retain(|p| p.id != *id);
        if list.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// --- LLM ---

/// Provider that answers with a fixed result and records every request.
#[derive(Clone)]
pub struct ScriptedProvider {
    pub reply: Result<String, String>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(CompletionResponse {
                content: text.clone(),
                model: request.model.clone(),
            }),
            Err(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
        }
    }
}
