//! Tenant-level accessors: group membership and the drive owner.

use async_trait::async_trait;
use sqlx::PgPool;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::types::{GroupId, UserId};
use drivehub_entity::store::{DriveOwner, GroupMembership};

/// Group membership lookup backed by the `group_members` table.
#[derive(Debug, Clone)]
pub struct PgGroupMembership {
    pool: PgPool,
}

impl PgGroupMembership {
    /// Create a new accessor over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupMembership for PgGroupMembership {
    async fn is_member(&self, user: UserId, group: GroupId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE user_id = $1 AND group_id = $2)",
        )
        .bind(user)
        .bind(group)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check membership", e))
    }
}

/// Drive owner lookup backed by the `drive_settings` table.
///
/// The table holds exactly one row per tenant database.
#[derive(Debug, Clone)]
pub struct PgDriveOwner {
    pool: PgPool,
}

impl PgDriveOwner {
    /// Create a new accessor over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveOwner for PgDriveOwner {
    async fn owner(&self) -> AppResult<UserId> {
        sqlx::query_scalar::<_, UserId>("SELECT owner_id FROM drive_settings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load owner", e))?
            .ok_or_else(|| {
                AppError::new(ErrorKind::Configuration, "Drive owner is not configured")
            })
    }
}
