//! QueryRepository trait definition.

use haven_types::error::RepositoryError;
use haven_types::query::{CounselorQuery, QueryResponse, QueryStatus};
use uuid::Uuid;

/// Repository trait for counselor queries and their responses.
pub trait QueryRepository: Send + Sync {
    fn create_query(
        &self,
        query: &CounselorQuery,
    ) -> impl std::future::Future<Output = Result<CounselorQuery, RepositoryError>> + Send;

    fn get_query(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<CounselorQuery>, RepositoryError>> + Send;

    /// Queries submitted by a user, ordered by created_at DESC.
    fn list_for_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<CounselorQuery>, RepositoryError>> + Send;

    /// Queries addressed to a counselor, ordered by created_at DESC.
    fn list_for_counselor(
        &self,
        counselor_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<CounselorQuery>, RepositoryError>> + Send;

    fn update_status(
        &self,
        id: &Uuid,
        status: QueryStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn add_response(
        &self,
        response: &QueryResponse,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Responses to a query, ordered by created_at ASC.
    fn list_responses(
        &self,
        query_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<QueryResponse>, RepositoryError>> + Send;
}
