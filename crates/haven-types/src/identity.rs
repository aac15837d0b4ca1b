//! Caller identity as seen by the core.
//!
//! Authentication itself is delegated to the hosted auth provider; the core
//! only distinguishes a signed-in user from a guest client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    /// A signed-in user.
    User { id: Uuid, email: Option<String> },
    /// An unauthenticated visitor, identified only by its client instance.
    Guest { client_id: String },
}

impl Identity {
    /// The signed-in user's id, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User { id, .. } => Some(*id),
            Identity::Guest { .. } => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest { .. })
    }

    /// Ephemeral-store scope for this caller.
    pub fn scope(&self) -> String {
        match self {
            Identity::User { id, .. } => format!("user:{id}"),
            Identity::Guest { client_id } => format!("guest:{client_id}"),
        }
    }
}
