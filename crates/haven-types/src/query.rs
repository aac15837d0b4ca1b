//! Counselor query types.
//!
//! A query is an asynchronous question a signed-in user sends to a specific
//! counselor, answered later through one or more responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a counselor query.
///
/// Maps to `CHECK (status IN ('pending', 'answered', 'closed'))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    #[default]
    Pending,
    Answered,
    Closed,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Pending => write!(f, "pending"),
            QueryStatus::Answered => write!(f, "answered"),
            QueryStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for QueryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(QueryStatus::Pending),
            "answered" => Ok(QueryStatus::Answered),
            "closed" => Ok(QueryStatus::Closed),
            other => Err(format!("invalid query status: '{other}'")),
        }
    }
}

/// A question sent by a user to a counselor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounselorQuery {
    pub id: Uuid,
    pub user_id: Uuid,
    pub counselor_id: Uuid,
    pub subject: String,
    pub content: String,
    pub is_anonymous: bool,
    pub status: QueryStatus,
    pub created_at: DateTime<Utc>,
}

/// A counselor's answer to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub id: Uuid,
    pub query_id: Uuid,
    pub responder_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A query joined with the counselor name and its responses (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryThread {
    pub query: CounselorQuery,
    pub counselor_name: Option<String>,
    pub responses: Vec<QueryResponse>,
}

/// Fields a user submits to open a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuery {
    pub counselor_id: Uuid,
    pub subject: String,
    pub content: String,
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
}

fn default_anonymous() -> bool {
    true
}
