//! Breadcrumb visibility derivation.
//!
//! `derive_visibility` summarizes the grants *directly on* one node into
//! public/private view/modify booleans — a per-node summary, not an
//! effective-permission computation. `breadcrumbs` walks the same chain
//! as the directory evaluator and truncates the trail at the first node
//! the requester cannot view.

use std::sync::Arc;

use drivehub_core::AppResult;
use drivehub_entity::store::{
    DirectoryGrantStore, DriveOwner, GroupMembership, ResourceMetadata,
};
use drivehub_entity::{
    Breadcrumb, DirectoryPermission, DirectoryResource, GranteeIdentity, VisibilitySummary,
};

use crate::chain::{ChainNode, ChainWalker};
use crate::evaluator::{DirectoryPermissionEvaluator, is_drive_owner};

/// Derives per-node visibility summaries and breadcrumb trails.
#[derive(Clone)]
pub struct BreadcrumbDeriver {
    /// Directory grant store.
    grants: Arc<dyn DirectoryGrantStore>,
    /// Metadata accessor (disk names for drive roots).
    metadata: Arc<dyn ResourceMetadata>,
    /// Drive owner accessor.
    owner: Arc<dyn DriveOwner>,
    /// Ancestor chain builder.
    walker: ChainWalker,
    /// Effective-permission evaluator for the VIEW filter.
    evaluator: DirectoryPermissionEvaluator,
}

impl BreadcrumbDeriver {
    /// Creates a new breadcrumb deriver.
    pub fn new(
        grants: Arc<dyn DirectoryGrantStore>,
        metadata: Arc<dyn ResourceMetadata>,
        membership: Arc<dyn GroupMembership>,
        owner: Arc<dyn DriveOwner>,
    ) -> Self {
        Self {
            grants: grants.clone(),
            metadata: metadata.clone(),
            owner: owner.clone(),
            walker: ChainWalker::new(metadata.clone()),
            evaluator: DirectoryPermissionEvaluator::new(grants, metadata, membership, owner),
        }
    }

    /// Summarize the active grants directly on `resource` at `as_of_ms`.
    pub async fn derive_visibility(
        &self,
        resource: &DirectoryResource,
        as_of_ms: i64,
    ) -> AppResult<VisibilitySummary> {
        let grants = self.grants.find_by_resource(resource).await?;
        let mut summary = VisibilitySummary::default();

        for grant in &grants {
            if !grant.is_active_at(as_of_ms) {
                continue;
            }
            let view = grant
                .permission_types
                .contains(&DirectoryPermission::View);
            let modify = grant.permission_types.iter().any(|p| p.is_modify());

            if grant.granted_to.is_public() {
                summary.public_view |= view;
                summary.public_modify |= modify;
            } else {
                summary.private_view |= view;
                summary.private_modify |= modify;
            }
        }

        Ok(summary)
    }

    /// Build the permission-filtered breadcrumb trail for `resource`,
    /// ordered root-to-leaf.
    ///
    /// Walking leaf-to-root, the trail stops at the first node the
    /// requester cannot view (owner sees everything); the sovereign
    /// boundary and drive root are already enforced by the chain walk.
    pub async fn breadcrumbs(
        &self,
        resource: &DirectoryResource,
        requester: &GranteeIdentity,
        as_of_ms: i64,
    ) -> AppResult<Vec<Breadcrumb>> {
        let chain = self.walker.build(resource).await?;
        let owner_bypass = is_drive_owner(self.owner.as_ref(), requester).await?;

        let mut trail = Vec::with_capacity(chain.len());
        for node in chain.iter().rev() {
            if !owner_bypass {
                let perms = self
                    .evaluator
                    .evaluate(&node.resource, requester, as_of_ms)
                    .await?;
                if !perms.contains(&DirectoryPermission::View) {
                    break;
                }
            }

            let visibility = self.derive_visibility(&node.resource, as_of_ms).await?;
            trail.push(Breadcrumb {
                resource: node.resource,
                name: self.display_name(node).await?,
                visibility: visibility.label(),
            });
        }

        trail.reverse();
        Ok(trail)
    }

    /// A folder sitting at its disk's root path reports the disk's display
    /// name instead of its own.
    async fn display_name(&self, node: &ChainNode) -> AppResult<String> {
        if matches!(node.resource, DirectoryResource::Folder(_)) {
            if let Some(disk) = self.metadata.disk(node.disk_id).await? {
                if disk.root_path == node.full_path {
                    return Ok(disk.name);
                }
            }
        }
        Ok(node.name.clone())
    }
}

impl std::fmt::Debug for BreadcrumbDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreadcrumbDeriver").finish()
    }
}
