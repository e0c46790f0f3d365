//! Grant store traits.
//!
//! A grant and its permission-type and label rows are one logical unit:
//! `insert`, `update`, and `delete` must be atomic across all of them.
//! `mark_redeemed` is a compare-and-set — it converts a placeholder grant
//! into a user grant only if `redeemed_from` is still unset, so concurrent
//! redemption attempts serialize to at most one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use drivehub_core::AppResult;
use drivehub_core::types::{GrantId, UserId};

use crate::grant::{DirectoryGrant, SystemGrant};
use crate::identity::{DirectoryResource, GranteeIdentity, SystemResource};

/// Store for directory (file/folder) permission grants.
#[async_trait]
pub trait DirectoryGrantStore: Send + Sync + 'static {
    /// Find a grant by its primary key.
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<DirectoryGrant>>;

    /// Find all grants whose resource equals `resource` exactly.
    async fn find_by_resource(
        &self,
        resource: &DirectoryResource,
    ) -> AppResult<Vec<DirectoryGrant>>;

    /// Find all grants issued to `grantee`.
    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<DirectoryGrant>>;

    /// Persist a new grant together with its type and label rows.
    async fn insert(&self, grant: &DirectoryGrant) -> AppResult<()>;

    /// Replace an existing grant row and its type and label rows.
    async fn update(&self, grant: &DirectoryGrant) -> AppResult<()>;

    /// Delete a grant and its associations. Returns `false` if absent.
    async fn delete(&self, id: &GrantId) -> AppResult<bool>;

    /// Atomically convert a placeholder grant into a user grant.
    ///
    /// Sets `granted_to = User(redeemer)`, clears `redeem_code`, records
    /// the original placeholder in `redeemed_from`, and bumps
    /// `last_modified_at`, but only when `redeemed_from` is still unset
    /// and the grantee is still a placeholder. Returns the updated grant,
    /// read back inside the same atomic unit, or `None` when the guard
    /// fails (a concurrent redemption won).
    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<DirectoryGrant>>;
}

/// Store for system (table/record) permission grants.
#[async_trait]
pub trait SystemGrantStore: Send + Sync + 'static {
    /// Find a grant by its primary key.
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<SystemGrant>>;

    /// Find all grants whose resource equals `resource` exactly.
    async fn find_by_resource(&self, resource: &SystemResource) -> AppResult<Vec<SystemGrant>>;

    /// Find all grants issued to `grantee`.
    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<SystemGrant>>;

    /// Persist a new grant together with its type and label rows.
    async fn insert(&self, grant: &SystemGrant) -> AppResult<()>;

    /// Replace an existing grant row and its type and label rows.
    async fn update(&self, grant: &SystemGrant) -> AppResult<()>;

    /// Delete a grant and its associations. Returns `false` if absent.
    async fn delete(&self, id: &GrantId) -> AppResult<bool>;

    /// Atomically convert a placeholder grant into a user grant.
    ///
    /// Same compare-and-set contract as
    /// [`DirectoryGrantStore::mark_redeemed`].
    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SystemGrant>>;
}
