//! Permission grant entity models.
//!
//! Validity windows are epoch milliseconds: `begin_at <= 0` means active
//! from the start, `expire_at < 0` means never expires. A grant issued to
//! a [`GranteeIdentity::Placeholder`] carries a redeem code until it is
//! converted into a user grant; `redeemed_from` records the original
//! placeholder and is never mutated again afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivehub_core::types::{GrantId, PlaceholderId, UserId};

use crate::identity::{DirectoryResource, GranteeIdentity, SystemResource};

use super::types::{DirectoryPermission, SystemPermission};

/// Whether a window defined by `begin_at`/`expire_at` contains `at_ms`.
fn window_contains(begin_at: i64, expire_at: i64, at_ms: i64) -> bool {
    (begin_at <= 0 || begin_at <= at_ms) && (expire_at < 0 || expire_at > at_ms)
}

/// A permission grant on a file or folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryGrant {
    /// Unique grant identifier.
    pub id: GrantId,
    /// The file or folder this grant applies to.
    pub resource: DirectoryResource,
    /// Disk-qualified path of the resource, captured at creation time.
    pub resource_path: String,
    /// The grantee this permission is issued to.
    pub granted_to: GranteeIdentity,
    /// The user who issued the grant.
    pub granted_by: UserId,
    /// The set of granted actions.
    pub permission_types: BTreeSet<DirectoryPermission>,
    /// Epoch ms the grant becomes active (`<= 0` = active from the start).
    pub begin_at: i64,
    /// Epoch ms the grant expires (`< 0` = never).
    pub expire_at: i64,
    /// Whether the grant flows down to descendant resources.
    pub inheritable: bool,
    /// Free-text note attached by the granter.
    pub note: String,
    /// Opaque label tags.
    pub labels: BTreeSet<String>,
    /// One-time code, present while `granted_to` is a placeholder.
    pub redeem_code: Option<String>,
    /// The original placeholder, set once redemption occurs.
    pub redeemed_from: Option<PlaceholderId>,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last modified.
    pub last_modified_at: DateTime<Utc>,
}

impl DirectoryGrant {
    /// Whether the grant is active at the given epoch-millisecond instant.
    pub fn is_active_at(&self, at_ms: i64) -> bool {
        window_contains(self.begin_at, self.expire_at, at_ms)
    }
}

/// A permission grant on a table or record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemGrant {
    /// Unique grant identifier.
    pub id: GrantId,
    /// The table or record this grant applies to.
    pub resource: SystemResource,
    /// The grantee this permission is issued to.
    pub granted_to: GranteeIdentity,
    /// The user who issued the grant.
    pub granted_by: UserId,
    /// The set of granted actions.
    pub permission_types: BTreeSet<SystemPermission>,
    /// Epoch ms the grant becomes active (`<= 0` = active from the start).
    pub begin_at: i64,
    /// Epoch ms the grant expires (`< 0` = never).
    pub expire_at: i64,
    /// Free-text note attached by the granter.
    pub note: String,
    /// Opaque label tags.
    pub labels: BTreeSet<String>,
    /// One-time code, present while `granted_to` is a placeholder.
    pub redeem_code: Option<String>,
    /// The original placeholder, set once redemption occurs.
    pub redeemed_from: Option<PlaceholderId>,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last modified.
    pub last_modified_at: DateTime<Utc>,
}

impl SystemGrant {
    /// Whether the grant is active at the given epoch-millisecond instant.
    pub fn is_active_at(&self, at_ms: i64) -> bool {
        window_contains(self.begin_at, self.expire_at, at_ms)
    }
}
