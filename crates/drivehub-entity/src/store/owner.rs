//! Drive owner accessor.

use async_trait::async_trait;

use drivehub_core::AppResult;
use drivehub_core::types::UserId;

/// Lookup of the tenant's owning user.
///
/// The store is scoped to one tenant, so the owner is a single identity.
/// Evaluators short-circuit to the full permission set for this user.
#[async_trait]
pub trait DriveOwner: Send + Sync + 'static {
    /// The user who owns this drive tenant.
    async fn owner(&self) -> AppResult<UserId>;
}
