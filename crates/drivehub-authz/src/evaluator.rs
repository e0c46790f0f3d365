//! Effective permission evaluators.
//!
//! Both families follow the same shape: owner bypass first, then union
//! the permission types of every applicable active grant. The directory
//! family enumerates candidates along the inheritance chain; the system
//! family matches the resource exactly. The shared accumulation core is
//! generic over the grant record so the pattern exists once.

use std::collections::BTreeSet;
use std::sync::Arc;

use drivehub_core::AppResult;
use drivehub_entity::store::{
    DirectoryGrantStore, DriveOwner, GroupMembership, ResourceMetadata, SystemGrantStore,
};
use drivehub_entity::{
    DirectoryGrant, DirectoryPermission, DirectoryResource, GranteeIdentity, SystemGrant,
    SystemPermission, SystemResource,
};

use crate::applicability::grantee_applies;
use crate::chain::ChainWalker;

/// Common view over the two grant families used by the accumulation core.
pub(crate) trait GrantRecord {
    /// The permission type this grant family carries.
    type Permission: Copy + Ord;

    /// The grantee the grant was issued to.
    fn granted_to(&self) -> &GranteeIdentity;

    /// The granted action set.
    fn permission_types(&self) -> &BTreeSet<Self::Permission>;

    /// Whether the grant is active at the given instant.
    fn is_active_at(&self, at_ms: i64) -> bool;
}

impl GrantRecord for DirectoryGrant {
    type Permission = DirectoryPermission;

    fn granted_to(&self) -> &GranteeIdentity {
        &self.granted_to
    }

    fn permission_types(&self) -> &BTreeSet<DirectoryPermission> {
        &self.permission_types
    }

    fn is_active_at(&self, at_ms: i64) -> bool {
        DirectoryGrant::is_active_at(self, at_ms)
    }
}

impl GrantRecord for SystemGrant {
    type Permission = SystemPermission;

    fn granted_to(&self) -> &GranteeIdentity {
        &self.granted_to
    }

    fn permission_types(&self) -> &BTreeSet<SystemPermission> {
        &self.permission_types
    }

    fn is_active_at(&self, at_ms: i64) -> bool {
        SystemGrant::is_active_at(self, at_ms)
    }
}

/// Union the types of every grant that is active at `as_of_ms` and whose
/// grantee applies to `requester` into `acc`.
pub(crate) async fn accumulate<'a, G, I>(
    membership: &dyn GroupMembership,
    requester: &GranteeIdentity,
    as_of_ms: i64,
    grants: I,
    acc: &mut BTreeSet<G::Permission>,
) -> AppResult<()>
where
    G: GrantRecord + 'a,
    I: IntoIterator<Item = &'a G>,
{
    for grant in grants {
        if !grant.is_active_at(as_of_ms) {
            continue;
        }
        if grantee_applies(membership, grant.granted_to(), requester).await? {
            acc.extend(grant.permission_types().iter().copied());
        }
    }
    Ok(())
}

/// Whether `requester` is the drive owner's user identity.
pub(crate) async fn is_drive_owner(
    owner: &dyn DriveOwner,
    requester: &GranteeIdentity,
) -> AppResult<bool> {
    Ok(requester.as_user() == Some(owner.owner().await?))
}

/// Evaluates effective permissions on files and folders, honoring the
/// inheritance chain, sovereign boundaries, and the `inheritable` flag.
#[derive(Clone)]
pub struct DirectoryPermissionEvaluator {
    /// Directory grant store.
    grants: Arc<dyn DirectoryGrantStore>,
    /// Group membership accessor.
    membership: Arc<dyn GroupMembership>,
    /// Drive owner accessor.
    owner: Arc<dyn DriveOwner>,
    /// Ancestor chain builder.
    walker: ChainWalker,
}

impl DirectoryPermissionEvaluator {
    /// Creates a new directory permission evaluator.
    pub fn new(
        grants: Arc<dyn DirectoryGrantStore>,
        metadata: Arc<dyn ResourceMetadata>,
        membership: Arc<dyn GroupMembership>,
        owner: Arc<dyn DriveOwner>,
    ) -> Self {
        Self {
            grants,
            membership,
            owner,
            walker: ChainWalker::new(metadata),
        }
    }

    /// Compute the effective permission set for `requester` on `resource`
    /// at the instant `as_of_ms`.
    ///
    /// A resource that does not exist evaluates to the empty set.
    pub async fn evaluate(
        &self,
        resource: &DirectoryResource,
        requester: &GranteeIdentity,
        as_of_ms: i64,
    ) -> AppResult<BTreeSet<DirectoryPermission>> {
        if is_drive_owner(self.owner.as_ref(), requester).await? {
            return Ok(DirectoryPermission::all());
        }

        let chain = self.walker.build(resource).await?;
        let mut acc = BTreeSet::new();

        for node in &chain {
            let node_grants = self.grants.find_by_resource(&node.resource).await?;
            let is_origin = node.resource == *resource;
            // Non-inheritable grants only count on the resource itself,
            // never via inheritance from an ancestor.
            let applicable = node_grants
                .iter()
                .filter(|g| g.inheritable || is_origin);
            accumulate::<DirectoryGrant, _>(
                self.membership.as_ref(),
                requester,
                as_of_ms,
                applicable,
                &mut acc,
            )
            .await?;
        }

        Ok(acc)
    }
}

impl std::fmt::Debug for DirectoryPermissionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryPermissionEvaluator").finish()
    }
}

/// Evaluates effective permissions on tables and records. No hierarchy:
/// only grants on the exact resource are considered.
#[derive(Clone)]
pub struct SystemPermissionEvaluator {
    /// System grant store.
    grants: Arc<dyn SystemGrantStore>,
    /// Group membership accessor.
    membership: Arc<dyn GroupMembership>,
    /// Drive owner accessor.
    owner: Arc<dyn DriveOwner>,
}

impl SystemPermissionEvaluator {
    /// Creates a new system permission evaluator.
    pub fn new(
        grants: Arc<dyn SystemGrantStore>,
        membership: Arc<dyn GroupMembership>,
        owner: Arc<dyn DriveOwner>,
    ) -> Self {
        Self {
            grants,
            membership,
            owner,
        }
    }

    /// Compute the effective permission set for `requester` on `resource`
    /// at the instant `as_of_ms`.
    pub async fn evaluate(
        &self,
        resource: &SystemResource,
        requester: &GranteeIdentity,
        as_of_ms: i64,
    ) -> AppResult<BTreeSet<SystemPermission>> {
        if is_drive_owner(self.owner.as_ref(), requester).await? {
            return Ok(SystemPermission::all());
        }

        let grants = self.grants.find_by_resource(resource).await?;
        let mut acc = BTreeSet::new();
        accumulate::<SystemGrant, _>(
            self.membership.as_ref(),
            requester,
            as_of_ms,
            grants.iter(),
            &mut acc,
        )
        .await?;

        Ok(acc)
    }
}

impl std::fmt::Debug for SystemPermissionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPermissionEvaluator").finish()
    }
}
