//! System grant lifecycle — create, update, delete, redeem, and
//! record-filtered reads for table/record grants.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use drivehub_authz::{SystemPermissionEvaluator, can_access_grant_record};
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::types::GrantId;
use drivehub_entity::store::{DriveOwner, GroupMembership, SystemGrantStore};
use drivehub_entity::{GranteeIdentity, SystemGrant, SystemPermission, SystemResource};

use crate::context::RequestContext;
use crate::permission::redeem;

/// Manages the lifecycle of system (table/record) grants.
///
/// System resources are flat identifiers with no metadata to resolve, so
/// unlike the directory family there is no existence check on create.
#[derive(Clone)]
pub struct SystemPermissionService {
    /// System grant store.
    grants: Arc<dyn SystemGrantStore>,
    /// Group membership accessor.
    membership: Arc<dyn GroupMembership>,
    /// Drive owner accessor.
    owner: Arc<dyn DriveOwner>,
    /// Effective permission evaluator, used for lifecycle gating.
    evaluator: SystemPermissionEvaluator,
}

/// Request to create a system grant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateSystemGrantRequest {
    /// Caller-supplied grant id; generated when absent.
    #[serde(default)]
    pub id: Option<GrantId>,
    /// Target table or record.
    pub resource: SystemResource,
    /// Who the grant is issued to.
    pub granted_to: GranteeIdentity,
    /// Granted action set; must be non-empty.
    pub permission_types: BTreeSet<SystemPermission>,
    /// Window start in epoch ms (defaults to 0, active immediately).
    pub begin_at: Option<i64>,
    /// Window end in epoch ms (defaults to -1, never expires).
    pub expire_at: Option<i64>,
    /// Free-form note.
    pub note: Option<String>,
    /// Organizational labels.
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

/// Partial-field patch for an existing system grant.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UpdateSystemGrantRequest {
    /// Replacement action set (full replace, not a merge).
    pub permission_types: Option<BTreeSet<SystemPermission>>,
    /// New window start.
    pub begin_at: Option<i64>,
    /// New window end.
    pub expire_at: Option<i64>,
    /// New note.
    pub note: Option<String>,
    /// Replacement label set.
    pub labels: Option<BTreeSet<String>>,
}

impl UpdateSystemGrantRequest {
    fn is_empty(&self) -> bool {
        self.permission_types.is_none()
            && self.begin_at.is_none()
            && self.expire_at.is_none()
            && self.note.is_none()
            && self.labels.is_none()
    }
}

impl SystemPermissionService {
    /// Creates a new system permission service.
    pub fn new(
        grants: Arc<dyn SystemGrantStore>,
        membership: Arc<dyn GroupMembership>,
        owner: Arc<dyn DriveOwner>,
    ) -> Self {
        let evaluator =
            SystemPermissionEvaluator::new(grants.clone(), membership.clone(), owner.clone());
        Self {
            grants,
            membership,
            owner,
            evaluator,
        }
    }

    /// Creates a new grant on a table or record.
    ///
    /// A placeholder grantee receives a generated one-time redeem code.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateSystemGrantRequest,
    ) -> AppResult<SystemGrant> {
        if req.permission_types.is_empty() {
            return Err(AppError::validation("Permission type set must not be empty"));
        }
        self.require_invite(ctx, &req.resource).await?;

        let redeem_code = req
            .granted_to
            .is_placeholder()
            .then(redeem::generate_redeem_code);

        let grant = SystemGrant {
            id: req.id.unwrap_or_else(GrantId::new),
            resource: req.resource,
            granted_to: req.granted_to,
            granted_by: ctx.user_id,
            permission_types: req.permission_types,
            begin_at: req.begin_at.unwrap_or(0),
            expire_at: req.expire_at.unwrap_or(-1),
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
            "System grant created"
        );
        Ok(grant)
    }

    /// Applies a partial patch to an existing grant.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
        req: UpdateSystemGrantRequest,
    ) -> AppResult<SystemGrant> {
        if req.is_empty() {
            return Err(AppError::validation("Update request has no fields to apply"));
        }
        let mut grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such system grant"))?;
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
        if let Some(note) = req.note {
            grant.note = note;
        }
        if let Some(labels) = req.labels {
            grant.labels = labels;
        }
        grant.last_modified_at = ctx.request_time;
        self.grants.update(&grant).await?;

        info!(grant_id = %grant.id, "System grant updated");
        Ok(grant)
    }

    /// Deletes a grant and its type and label associations.
    pub async fn delete(&self, ctx: &RequestContext, id: &GrantId) -> AppResult<()> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such system grant"))?;
        self.require_record_control(ctx, &grant).await?;

        if !self.grants.delete(id).await? {
            return Err(AppError::grant_not_found("No such system grant"));
        }
        info!(grant_id = %id, deleted_by = %ctx.user_id, "System grant deleted");
        Ok(())
    }

    /// Fetches a grant the requester is a party to.
    pub async fn get(&self, ctx: &RequestContext, id: &GrantId) -> AppResult<SystemGrant> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such system grant"))?;

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
            return Err(AppError::grant_not_found("No such system grant"));
        }
        Ok(grant)
    }

    /// Lists the grants on a resource the requester is a party to.
    pub async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: &SystemResource,
    ) -> AppResult<Vec<SystemGrant>> {
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
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
        code: &str,
    ) -> AppResult<SystemGrant> {
        let grant = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such system grant"))?;

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

    /// Forks a per-user grant from a public grant, leaving it untouched.
    pub async fn redeem_public(
        &self,
        ctx: &RequestContext,
        id: &GrantId,
    ) -> AppResult<SystemGrant> {
        let source = self
            .grants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::grant_not_found("No such system grant"))?;
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

        let fork = SystemGrant {
            id: GrantId::new(),
            resource: source.resource.clone(),
            granted_to: GranteeIdentity::User(ctx.user_id),
            granted_by: source.granted_by,
            permission_types: source.permission_types.clone(),
            begin_at: source.begin_at,
            expire_at: source.expire_at,
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
    pub fn evaluator(&self) -> &SystemPermissionEvaluator {
        &self.evaluator
    }

    async fn is_owner(&self, ctx: &RequestContext) -> AppResult<bool> {
        Ok(self.owner.owner().await? == ctx.user_id)
    }

    /// Gate for issuing grants: drive owner, or Invite on the target.
    async fn require_invite(
        &self,
        ctx: &RequestContext,
        resource: &SystemResource,
    ) -> AppResult<()> {
        if self.is_owner(ctx).await? {
            return Ok(());
        }
        let effective = self
            .evaluator
            .evaluate(resource, &ctx.grantee(), ctx.request_ms())
            .await?;
        if effective.contains(&SystemPermission::Invite) {
            return Ok(());
        }
        Err(AppError::permission_denied(
            "Requester may not manage grants on this resource",
        ))
    }

    async fn require_record_control(
        &self,
        ctx: &RequestContext,
        grant: &SystemGrant,
    ) -> AppResult<()> {
        if grant.granted_by == ctx.user_id {
            return Ok(());
        }
        self.require_invite(ctx, &grant.resource).await
    }
}

impl std::fmt::Debug for SystemPermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPermissionService").finish()
    }
}
