//! Request context carrying the acting user and the request instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivehub_core::types::UserId;
use drivehub_entity::GranteeIdentity;

/// Context for the current authenticated request.
///
/// Built by the embedding API layer after authentication and passed into
/// service methods so that every operation knows *who* is acting and *when*
/// the request was received. The request instant is captured once so all
/// temporal checks within one request agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current instant.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            request_time: Utc::now(),
        }
    }

    /// Creates a context at an explicit instant.
    pub fn at(user_id: UserId, request_time: DateTime<Utc>) -> Self {
        Self {
            user_id,
            request_time,
        }
    }

    /// The acting user as a grantee identity.
    pub fn grantee(&self) -> GranteeIdentity {
        GranteeIdentity::User(self.user_id)
    }

    /// The request instant in epoch milliseconds, for window checks.
    pub fn request_ms(&self) -> i64 {
        self.request_time.timestamp_millis()
    }
}
