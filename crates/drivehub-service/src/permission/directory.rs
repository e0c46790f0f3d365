//! Directory grant lifecycle — create, update, delete, redeem, and
//! record-filtered reads for file/folder grants.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use drivehub_authz::{DirectoryPermissionEvaluator, can_access_grant_record};
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::types::GrantId;
use drivehub_entity::store::{
    DirectoryGrantStore, DriveOwner, GroupMembership, ResourceMetadata,
};
use drivehub_entity::{DirectoryGrant, DirectoryPermission, DirectoryResource, GranteeIdentity};

use crate::context::RequestContext;
use crate::permission::redeem;

/// Manages the lifecycle of directory (file/folder) grants.
#[derive(Clone)]
pub struct DirectoryPermissionService {
    /// Directory grant store.
    grants: Arc<dyn DirectoryGrantStore>,
    /// Resource metadata accessor.
    metadata: Arc<dyn ResourceMetadata>,
    /// Group membership accessor.
    membership: Arc<dyn GroupMembership>,
    /// Drive owner accessor.
    owner: Arc<dyn DriveOwner>,
    /// Effective permission evaluator, used for lifecycle gating.
    evaluator: DirectoryPermissionEvaluator,
}

/// Request to create a directory grant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateDirectoryGrantRequest {
    /// Caller-supplied grant id; generated when absent.
    #[serde(default)]
    pub id: Option<GrantId>,
    /// Target file or folder.
    pub resource: DirectoryResource,
    /// Who the grant is issued to.
    pub granted_to: GranteeIdentity,
    /// Granted action set; must be non-empty.
    pub permission_types: BTreeSet<DirectoryPermission>,
    /// Window start in epoch ms (defaults to 0, active immediately).
    pub begin_at: Option<i64>,
    /// Window end in epoch ms (defaults to -1, never expires).
    pub expire_at: Option<i64>,
    /// Whether descendants inherit this grant.
    pub inheritable: bool,
    /// Free-form note.
    pub note: Option<String>,
    /// Organizational labels.
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

/// Partial-field patch for an existing directory grant.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UpdateDirectoryGrantRequest {
    /// Replacement action set (full replace, not a merge).
    pub permission_types: Option<BTreeSet<DirectoryPermission>>,
    /// New window start.
    pub begin_at: Option<i64>,
    /// New window end.
    pub expire_at: Option<i64>,
    /// New inheritance flag.
    pub inheritable: Option<bool>,
    /// New note.
    pub note: Option<String>,
    /// Replacement label set.
    pub labels: Option<BTreeSet<String>>,
}

impl UpdateDirectoryGrantRequest {
    fn is_empty(&self) -> bool {
        self.permission_types.is_none()
            && self.begin_at.is_none()
            && self.expire_at.is_none()
            && self.inheritable.is_none()
            && self.note.is_none()
            && self.labels.is_none()
    }
}

impl DirectoryPermissionService {
    /// Creates a new directory permission service.
    pub fn new(
        grants: Arc<dyn DirectoryGrantStore>,
        metadata: Arc<dyn ResourceMetadata>,
        membership: Arc<dyn GroupMembership>,
        owner: Arc<dyn DriveOwner>,
    ) -> Self {
        let evaluator = DirectoryPermissionEvaluator::new(
            grants.clone(),
            metadata.clone(),
            membership.clone(),
            owner.clone(),
        );
        Self {
            grants,
            metadata,
            membership,
            owner,
            evaluator,
        }
    }

    /// Creates a new grant on a file or folder.
    ///
    /// The target must exist; its current path is captured on the grant.
    /// A placeholder grantee receives a generated one-time redeem code.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateDirectoryGrantRequest,
    ) -> AppResult<DirectoryGrant> {
        if req.permission_types.is_empty() {
            return Err(AppError::validation("Permission type set must not be empty"));
        }
        let resource_path = self.resource_path(&req.resource).await?;
        self.require_invite(ctx, &req.resource).await?;

        let redeem_code = req
            .granted_to
            .is_placeholder()
            .then(redeem::generate_redeem_code);

        let grant = DirectoryGrant {
            id: req.id.unwrap_or_else(GrantId::new),
            resource: req.resource,
            resource_path,
            granted_to: req.granted_to,
            granted_by: ctx.user_id,
            permission_types: req.permission_types,
            begin_at: req.begin_at.unwrap_or(0),
            expire_at: req.expire_at.unwrap_or(-1),
            inheritable: req.inheritable,
            note: req.note.unwrap_or_default(),
            labels: req.labels,
            redeem_code,
            redeemed_from: None,
            created_at: ctx.request_time,
            last_modified_at: ctx.request_time,
        };
        self.grants.insert(&grant).await?;

        info!(
            grant_id = %grant.id,
            resource = %grant.resource,
            granted_by = %ctx.user_id,
            "Directory grant created"
        );
        Ok(grant)
    }

    /// Applies a partial patch to an existing grant.
    ///
    /// A patch with no fields set is a caller error. A supplied
    /// `permission_types` set replaces the stored set wholesale.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
        req: UpdateDirectoryGrantRequest,
    ) -> AppResult<DirectoryGrant> {
        if req.is_empty() {
            return Err(AppError::validation("Update request has no fields to apply"));
        }
        let mut grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such directory grant"))?;
        self.require_record_control(ctx, &grant).await?;

        if let Some(types) = req.permission_types {
            if types.is_empty() {
                return Err(AppError::validation("Permission type set must not be empty"));
            }
            grant.permission_types = types;
        }
        if let Some(begin_at) = req.begin_at {
            grant.begin_at = begin_at;
        }
        if let Some(expire_at) = req.expire_at {
            grant.expire_at = expire_at;
        }
        if let Some(inheritable) = req.inheritable {
            grant.inheritable = inheritable;
        }
        if let Some(note) = req.note {
            grant.note = note;
        }
        if let Some(labels) = req.labels {
            grant.labels = labels;
        }
        grant.last_modified_at = ctx.request_time;
        self.grants.update(&grant).await?;

        info!(grant_id = %grant.id, "Directory grant updated");
        Ok(grant)
    }

    /// Deletes a grant and its type and label associations.
    pub async fn delete(&self, ctx: &RequestContext, id: &GrantId) -> AppResult<()> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such directory grant"))?;
        self.require_record_control(ctx, &grant).await?;

        if !self.grants.delete(id).await? {
            return Err(AppError::grant_not_found("No such directory grant"));
        }
        info!(grant_id = %id, deleted_by = %ctx.user_id, "Directory grant deleted");
        Ok(())
    }

    /// Fetches a grant the requester is a party to.
    ///
    /// A grant outside the requester's view reads as absent, so callers
    /// cannot probe for record existence.
    pub async fn get(&self, ctx: &RequestContext, id: &GrantId) -> AppResult<DirectoryGrant> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such directory grant"))?;

        let is_owner = self.is_owner(ctx).await?;
        let visible = can_access_grant_record(
            self.membership.as_ref(),
            &ctx.grantee(),
            &grant.granted_to,
            grant.granted_by,
            is_owner,
        )
        .await?;
        if !visible {
            return Err(AppError::grant_not_found("No such directory grant"));
        }
        Ok(grant)
    }

    /// Lists the grants on a resource the requester is a party to.
    pub async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: &DirectoryResource,
    ) -> AppResult<Vec<DirectoryGrant>> {
        let is_owner = self.is_owner(ctx).await?;
        let requester = ctx.grantee();

        let mut visible = Vec::new();
        for grant in self.grants.find_by_resource(resource).await? {
            if can_access_grant_record(
                self.membership.as_ref(),
                &requester,
                &grant.granted_to,
                grant.granted_by,
                is_owner,
            )
            .await?
            {
                visible.push(grant);
            }
        }
        Ok(visible)
    }

    /// Redeems a placeholder grant with its one-time code.
    ///
    /// On success the grant is reissued to the redeeming user in place;
    /// the original placeholder is recorded in `redeemed_from`. The store
    /// re-verifies the idempotency guard inside the atomic write, so a
    /// concurrent redemption loses cleanly with `AlreadyRedeemed`.
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
        code: &str,
    ) -> AppResult<DirectoryGrant> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such directory grant"))?;

        redeem::check_preconditions(
            &grant.granted_to,
            grant.redeemed_from.is_some(),
            grant.redeem_code.as_deref(),
            code,
            grant.begin_at,
            grant.expire_at,
            ctx.request_ms(),
        )?;

        let redeemed = self
            .grants
            .mark_redeemed(id, ctx.user_id, ctx.request_time)
            .await?
            .ok_or_else(|| AppError::already_redeemed("Grant has already been redeemed"))?;

        info!(grant_id = %id, redeemer = %ctx.user_id, "Placeholder grant redeemed");
        Ok(redeemed)
    }

    /// Forks a per-user grant from a public grant.
    ///
    /// The public grant is left untouched; the requester receives their
    /// own copy of its action set and window. Unlike placeholder
    /// redemption this never mutates the source record.
    pub async fn redeem_public(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
    ) -> AppResult<DirectoryGrant> {
        let source = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such directory grant"))?;
        if !source.granted_to.is_public() {
            return Err(AppError::not_redeemable(
                "Only a public grant can be forked to a user",
            ));
        }
        let now_ms = ctx.request_ms();
        if source.begin_at > 0 && source.begin_at > now_ms {
            return Err(AppError::not_yet_active("Grant window has not begun"));
        }
        if source.expire_at >= 0 && source.expire_at <= now_ms {
            return Err(AppError::expired("Grant window has ended"));
        }

        let fork = DirectoryGrant {
            id: GrantId::new(),
            resource: source.resource.clone(),
            resource_path: source.resource_path.clone(),
            granted_to: GranteeIdentity::User(ctx.user_id),
            granted_by: source.granted_by,
            permission_types: source.permission_types.clone(),
            begin_at: source.begin_at,
            expire_at: source.expire_at,
            inheritable: source.inheritable,
            note: source.note.clone(),
            labels: source.labels.clone(),
            redeem_code: None,
            redeemed_from: None,
            created_at: ctx.request_time,
            last_modified_at: ctx.request_time,
        };
        self.grants.insert(&fork).await?;

        info!(
            source_id = %id,
            grant_id = %fork.id,
            redeemer = %ctx.user_id,
            "Public grant forked to user"
        );
        Ok(fork)
    }

    /// The effective permission evaluator behind this service.
    pub fn evaluator(&self) -> &DirectoryPermissionEvaluator {
        &self.evaluator
    }

    async fn is_owner(&self, ctx: &RequestContext) -> AppResult<bool> {
        Ok(self.owner.owner().await? == ctx.user_id)
    }

    /// Gate for issuing grants: drive owner, or Invite/Manage on the target.
    async fn require_invite(
        &self,
        ctx: &RequestContext,
        resource: &DirectoryResource,
    ) -> AppResult<()> {
        if self.is_owner(ctx).await? {
            return Ok(());
        }
        let effective = self
            .evaluator
            .evaluate(resource, &ctx.grantee(), ctx.request_ms())
            .await?;
        if effective.contains(&DirectoryPermission::Invite)
            || effective.contains(&DirectoryPermission::Manage)
        {
            return Ok(());
        }
        Err(AppError::permission_denied(
            "Requester may not manage grants on this resource",
        ))
    }

    /// Gate for mutating an existing record: owner, granter, or
    /// Invite/Manage on the grant's resource.
    async fn require_record_control(
        &self,
        ctx: &RequestContext,
        grant: &DirectoryGrant,
    ) -> AppResult<()> {
        if grant.granted_by == ctx.user_id {
            return Ok(());
        }
        self.require_invite(ctx, &grant.resource).await
    }

    async fn resource_path(&self, resource: &DirectoryResource) -> AppResult<String> {
        match resource {
            DirectoryResource::File(id) => Ok(self
                .metadata
                .file(*id)
                .await?
                .ok_or_else(|| AppError::resource_not_found("File does not exist"))?
                .full_path),
            DirectoryResource::Folder(id) => Ok(self
                .metadata
                .folder(*id)
                .await?
                .ok_or_else(|| AppError::resource_not_found("Folder does not exist"))?
                .full_path),
        }
    }
}

impl std::fmt::Debug for DirectoryPermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryPermissionService").finish()
    }
}
