//! Counselor query service.
//!
//! Students submit a question to a specific counselor; the counselor (or an
//! admin) answers it later. A query starts `pending`, moves to `answered`
//! with its first response, and can be closed by its author.

use chrono::Utc;
use haven_types::error::QueryError;
use haven_types::guest::AuthRedirect;
use haven_types::identity::Identity;
use haven_types::profile::{Profile, UserRole};
use haven_types::query::{CounselorQuery, NewQuery, QueryResponse, QueryStatus, QueryThread};
use tracing::info;
use uuid::Uuid;

use crate::counselor::repository::CounselorRepository;
use crate::query::repository::QueryRepository;

/// Where a guest lands after signing in from the query form.
pub const QUERY_RETURN_PATH: &str = "/counselors";

pub const QUERY_SIGN_IN_MESSAGE: &str = "Please sign in to send a query to a counselor.";

pub struct QueryService<Q: QueryRepository, R: CounselorRepository> {
    queries: Q,
    counselors: R,
}

impl<Q: QueryRepository, R: CounselorRepository> QueryService<Q, R> {
    pub fn new(queries: Q, counselors: R) -> Self {
        Self {
            queries,
            counselors,
        }
    }

    /// Submit a new query. Guests are sent to sign in first.
    pub async fn submit(
        &self,
        identity: &Identity,
        new_query: NewQuery,
    ) -> Result<CounselorQuery, QueryError> {
        let Some(user_id) = identity.user_id() else {
            return Err(QueryError::SignInRequired(AuthRedirect::to_login(
                QUERY_RETURN_PATH,
                QUERY_SIGN_IN_MESSAGE,
            )));
        };

        let subject = new_query.subject.trim();
        let content = new_query.content.trim();
        if subject.is_empty() {
            return Err(QueryError::Validation("subject is required".to_string()));
        }
        if content.is_empty() {
            return Err(QueryError::Validation("content is required".to_string()));
        }

        match self.counselors.get(&new_query.counselor_id).await? {
            Some(counselor) if counselor.is_active => {}
            _ => return Err(QueryError::CounselorNotFound),
        }

        let query = CounselorQuery {
            id: Uuid::now_v7(),
            user_id,
            counselor_id: new_query.counselor_id,
            subject: subject.to_string(),
            content: content.to_string(),
            is_anonymous: new_query.is_anonymous,
            status: QueryStatus::Pending,
            created_at: Utc::now(),
        };
        let created = self.queries.create_query(&query).await?;
        info!(
            query_id = %created.id,
            counselor_id = %created.counselor_id,
            is_anonymous = created.is_anonymous,
            "Counselor query submitted"
        );
        Ok(created)
    }

    /// A user's queries with counselor names and responses, newest first.
    pub async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<QueryThread>, QueryError> {
        let queries = self.queries.list_for_user(user_id).await?;
        self.threads(queries).await
    }

    /// Queries addressed to the counselor linked to `user_id`.
    ///
    /// Users without a counselor record get an empty inbox.
    pub async fn inbox(&self, user_id: &Uuid) -> Result<Vec<QueryThread>, QueryError> {
        let Some(counselor) = self.counselors.get_by_user(user_id).await? else {
            return Ok(Vec::new());
        };
        let queries = self.queries.list_for_counselor(&counselor.id).await?;
        self.threads(queries).await
    }

    async fn threads(&self, queries: Vec<CounselorQuery>) -> Result<Vec<QueryThread>, QueryError> {
        let mut threads = Vec::with_capacity(queries.len());
        for query in queries {
            let counselor_name = self
                .counselors
                .get(&query.counselor_id)
                .await?
                .map(|c| c.full_name);
            let responses = self.queries.list_responses(&query.id).await?;
            threads.push(QueryThread {
                query,
                counselor_name,
                responses,
            });
        }
        Ok(threads)
    }

    /// Answer a query. Only the addressed counselor or an admin may respond.
    pub async fn respond(
        &self,
        responder: &Profile,
        query_id: &Uuid,
        content: &str,
    ) -> Result<QueryResponse, QueryError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(QueryError::Validation("response content is required".to_string()));
        }

        let query = self
            .queries
            .get_query(query_id)
            .await?
            .ok_or(QueryError::NotFound)?;

        let allowed = match responder.role {
            UserRole::Admin => true,
            UserRole::Counselor => self
                .counselors
                .get_by_user(&responder.id)
                .await?
                .is_some_and(|c| c.id == query.counselor_id),
            UserRole::User => false,
        };
        if !allowed {
            return Err(QueryError::Forbidden);
        }

        let response = QueryResponse {
            id: Uuid::now_v7(),
            query_id: query.id,
            responder_id: responder.id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.queries.add_response(&response).await?;

        if query.status == QueryStatus::Pending {
            self.queries
                .update_status(&query.id, QueryStatus::Answered)
                .await?;
        }
        info!(query_id = %query.id, responder_id = %responder.id, "Query answered");
        Ok(response)
    }

    /// Close a query. Only its author may do so.
    pub async fn close(&self, user_id: &Uuid, query_id: &Uuid) -> Result<(), QueryError> {
        let query = self
            .queries
            .get_query(query_id)
            .await?
            .ok_or(QueryError::NotFound)?;
        if query.user_id != *user_id {
            return Err(QueryError::Forbidden);
        }
        self.queries
            .update_status(query_id, QueryStatus::Closed)
            .await?;
        info!(query_id = %query_id, "Query closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCounselorRepository, MemoryQueryRepository, counselor};
    use haven_types::counselor::Counselor;

    fn setup() -> (
        QueryService<MemoryQueryRepository, MemoryCounselorRepository>,
        MemoryQueryRepository,
        Counselor,
        Uuid,
    ) {
        let counselor_user = Uuid::now_v7();
        let mut dr = counselor("Dr. Rao", "Anxiety");
        dr.user_id = Some(counselor_user);
        let queries = MemoryQueryRepository::default();
        let service = QueryService::new(
            queries.clone(),
            MemoryCounselorRepository::with(vec![dr.clone()]),
        );
        (service, queries, dr, counselor_user)
    }

    fn profile(id: Uuid, role: UserRole) -> Profile {
        Profile {
            id,
            email: "someone@vit.ac.in".to_string(),
            full_name: None,
            role,
            created_at: Utc::now(),
        }
    }

    fn new_query(counselor_id: Uuid) -> NewQuery {
        NewQuery {
            counselor_id,
            subject: "Exam anxiety".to_string(),
            content: "How do I stop panicking in exams?".to_string(),
            is_anonymous: true,
        }
    }

    #[tokio::test]
    async fn test_guest_must_sign_in() {
        let (service, _, dr, _) = setup();
        let guest = Identity::Guest {
            client_id: "tab".to_string(),
        };
        let err = service.submit(&guest, new_query(dr.id)).await.unwrap_err();
        match err {
            QueryError::SignInRequired(redirect) => {
                assert_eq!(redirect.path, "/login");
                assert_eq!(redirect.return_to, "/counselors");
            }
            other => panic!("expected sign-in redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_validates() {
        let (service, _, dr, _) = setup();
        let me = Identity::User {
            id: Uuid::now_v7(),
            email: None,
        };

        let mut blank = new_query(dr.id);
        blank.subject = "  ".to_string();
        assert!(matches!(
            service.submit(&me, blank).await,
            Err(QueryError::Validation(_))
        ));

        assert!(matches!(
            service.submit(&me, new_query(Uuid::now_v7())).await,
            Err(QueryError::CounselorNotFound)
        ));
    }

    #[tokio::test]
    async fn test_respond_flow() {
        let (service, queries, dr, counselor_user) = setup();
        let student = Uuid::now_v7();
        let me = Identity::User {
            id: student,
            email: None,
        };

        let query = service.submit(&me, new_query(dr.id)).await.unwrap();
        assert_eq!(query.status, QueryStatus::Pending);

        // A plain user and an unrelated counselor cannot answer.
        assert!(matches!(
            service
                .respond(&profile(student, UserRole::User), &query.id, "hi")
                .await,
            Err(QueryError::Forbidden)
        ));
        assert!(matches!(
            service
                .respond(&profile(Uuid::now_v7(), UserRole::Counselor), &query.id, "hi")
                .await,
            Err(QueryError::Forbidden)
        ));

        service
            .respond(
                &profile(counselor_user, UserRole::Counselor),
                &query.id,
                "Try box breathing before the exam.",
            )
            .await
            .unwrap();
        service
            .respond(&profile(Uuid::now_v7(), UserRole::Admin), &query.id, "Follow up")
            .await
            .unwrap();

        let threads = service.list_for_user(&student).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].query.status, QueryStatus::Answered);
        assert_eq!(threads[0].counselor_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(threads[0].responses.len(), 2);

        let inbox = service.inbox(&counselor_user).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(service.inbox(&student).await.unwrap().is_empty());

        assert!(matches!(
            service.close(&Uuid::now_v7(), &query.id).await,
            Err(QueryError::Forbidden)
        ));
        service.close(&student, &query.id).await.unwrap();
        assert_eq!(
            queries.get_query(&query.id).await.unwrap().unwrap().status,
            QueryStatus::Closed
        );
    }
}
