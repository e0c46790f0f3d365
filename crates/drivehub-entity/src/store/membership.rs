//! Group membership accessor.

use async_trait::async_trait;

use drivehub_core::AppResult;
use drivehub_core::types::{GroupId, UserId};

/// Membership lookup used when expanding group grantees.
#[async_trait]
pub trait GroupMembership: Send + Sync + 'static {
    /// Whether `user` is currently a member of `group`.
    async fn is_member(&self, user: UserId, group: GroupId) -> AppResult<bool>;
}
