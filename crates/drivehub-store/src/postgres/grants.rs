//! Grant store implementations over PostgreSQL.
//!
//! A grant is persisted as one row plus its permission-type and label
//! rows; every multi-row write runs inside a transaction so no partial
//! grant is ever observable. Identities are stored in their prefix-tagged
//! string forms and parsed on read.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::types::{GrantId, PlaceholderId, UserId};
use drivehub_entity::store::{DirectoryGrantStore, SystemGrantStore};
use drivehub_entity::{
    DirectoryGrant, DirectoryPermission, DirectoryResource, GranteeIdentity, SystemGrant,
    SystemPermission, SystemResource,
};

/// Raw `directory_grants` row before identity parsing.
#[derive(sqlx::FromRow)]
struct DirectoryGrantRow {
    id: Uuid,
    resource: String,
    resource_path: String,
    granted_to: String,
    granted_by: Uuid,
    begin_at: i64,
    expire_at: i64,
    inheritable: bool,
    note: String,
    redeem_code: Option<String>,
    redeemed_from: Option<Uuid>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl DirectoryGrantRow {
    /// Combine the row with its association sets into the domain model.
    ///
    /// A stored identity that no longer parses is data corruption, not a
    /// caller error, so it surfaces as `Database`.
    fn into_grant(
        self,
        permission_types: BTreeSet<DirectoryPermission>,
        labels: BTreeSet<String>,
    ) -> AppResult<DirectoryGrant> {
        let resource: DirectoryResource = self.resource.parse().map_err(|e: AppError| {
            AppError::new(
                ErrorKind::Database,
                format!("Corrupt resource id in grant {}: {}", self.id, e.message),
            )
        })?;
        let granted_to: GranteeIdentity = self.granted_to.parse().map_err(|e: AppError| {
            AppError::new(
                ErrorKind::Database,
                format!("Corrupt grantee id in grant {}: {}", self.id, e.message),
            )
        })?;

        Ok(DirectoryGrant {
            id: GrantId::from_uuid(self.id),
            resource,
            resource_path: self.resource_path,
            granted_to,
            granted_by: UserId::from_uuid(self.granted_by),
            permission_types,
            begin_at: self.begin_at,
            expire_at: self.expire_at,
            inheritable: self.inheritable,
            note: self.note,
            labels,
            redeem_code: self.redeem_code,
            redeemed_from: self.redeemed_from.map(PlaceholderId::from_uuid),
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
        })
    }
}

/// Directory grant store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgDirectoryGrantStore {
    pool: PgPool,
}

impl PgDirectoryGrantStore {
    /// Create a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load permission-type and label rows for a set of grant ids.
    async fn load_assocs(
        &self,
        ids: &[Uuid],
    ) -> AppResult<(
        HashMap<Uuid, BTreeSet<DirectoryPermission>>,
        HashMap<Uuid, BTreeSet<String>>,
    )> {
        let type_rows: Vec<(Uuid, DirectoryPermission)> = sqlx::query_as(
            "SELECT grant_id, permission FROM directory_grant_types WHERE grant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load grant types", e)
        })?;

        let label_rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT grant_id, label FROM directory_grant_labels WHERE grant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load grant labels", e)
        })?;

        let mut types: HashMap<Uuid, BTreeSet<DirectoryPermission>> = HashMap::new();
        for (grant_id, permission) in type_rows {
            types.entry(grant_id).or_default().insert(permission);
        }
        let mut labels: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for (grant_id, label) in label_rows {
            labels.entry(grant_id).or_default().insert(label);
        }
        Ok((types, labels))
    }

    /// Assemble domain grants from raw rows.
    async fn assemble(&self, rows: Vec<DirectoryGrantRow>) -> AppResult<Vec<DirectoryGrant>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let (mut types, mut labels) = self.load_assocs(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let t = types.remove(&row.id).unwrap_or_default();
                let l = labels.remove(&row.id).unwrap_or_default();
                row.into_grant(t, l)
            })
            .collect()
    }
}

#[async_trait]
impl DirectoryGrantStore for PgDirectoryGrantStore {
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<DirectoryGrant>> {
        let row: Option<DirectoryGrantRow> =
            sqlx::query_as("SELECT * FROM directory_grants WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find grant", e)
                })?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_resource(
        &self,
        resource: &DirectoryResource,
    ) -> AppResult<Vec<DirectoryGrant>> {
        let rows: Vec<DirectoryGrantRow> = sqlx::query_as(
            "SELECT * FROM directory_grants WHERE resource = $1 ORDER BY created_at ASC",
        )
        .bind(resource.as_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find grants by resource", e)
        })?;

        self.assemble(rows).await
    }

    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<DirectoryGrant>> {
        let rows: Vec<DirectoryGrantRow> = sqlx::query_as(
            "SELECT * FROM directory_grants WHERE granted_to = $1 ORDER BY created_at ASC",
        )
        .bind(grantee.as_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find grants by grantee", e)
        })?;

        self.assemble(rows).await
    }

    async fn insert(&self, grant: &DirectoryGrant) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO directory_grants \
             (id, resource, resource_path, granted_to, granted_by, begin_at, expire_at, \
              inheritable, note, redeem_code, redeemed_from, created_at, last_modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(grant.id)
        .bind(grant.resource.as_string())
        .bind(&grant.resource_path)
        .bind(grant.granted_to.as_string())
        .bind(grant.granted_by)
        .bind(grant.begin_at)
        .bind(grant.expire_at)
        .bind(grant.inheritable)
        .bind(&grant.note)
        .bind(&grant.redeem_code)
        .bind(grant.redeemed_from)
        .bind(grant.created_at)
        .bind(grant.last_modified_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert grant", e))?;

        for permission in &grant.permission_types {
            sqlx::query("INSERT INTO directory_grant_types (grant_id, permission) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(permission)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant type", e)
                })?;
        }
        for label in &grant.labels {
            sqlx::query("INSERT INTO directory_grant_labels (grant_id, label) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(label)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant label", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant insert", e)
        })
    }

    async fn update(&self, grant: &DirectoryGrant) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "UPDATE directory_grants SET \
             resource = $2, resource_path = $3, granted_to = $4, begin_at = $5, \
             expire_at = $6, inheritable = $7, note = $8, redeem_code = $9, \
             redeemed_from = $10, last_modified_at = $11 \
             WHERE id = $1",
        )
        .bind(grant.id)
        .bind(grant.resource.as_string())
        .bind(&grant.resource_path)
        .bind(grant.granted_to.as_string())
        .bind(grant.begin_at)
        .bind(grant.expire_at)
        .bind(grant.inheritable)
        .bind(&grant.note)
        .bind(&grant.redeem_code)
        .bind(grant.redeemed_from)
        .bind(grant.last_modified_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update grant", e))?;

        // Replace, not merge: the supplied sets are authoritative.
        sqlx::query("DELETE FROM directory_grant_types WHERE grant_id = $1")
            .bind(grant.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear grant types", e)
            })?;
        for permission in &grant.permission_types {
            sqlx::query("INSERT INTO directory_grant_types (grant_id, permission) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(permission)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant type", e)
                })?;
        }

        sqlx::query("DELETE FROM directory_grant_labels WHERE grant_id = $1")
            .bind(grant.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear grant labels", e)
            })?;
        for label in &grant.labels {
            sqlx::query("INSERT INTO directory_grant_labels (grant_id, label) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(label)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant label", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant update", e)
        })
    }

    async fn delete(&self, id: &GrantId) -> AppResult<bool> {
        // Type and label rows cascade.
        let result = sqlx::query("DELETE FROM directory_grants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete grant", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<DirectoryGrant>> {
        // Guarded CAS: the WHERE clause re-verifies that no concurrent
        // redemption has won; `redeemed_from` captures the pre-update
        // grantee payload. The updated row and its association rows are
        // read back in the same transaction, so callers get the redeemed
        // state without a second round trip that could observe a later
        // write.
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let row: Option<DirectoryGrantRow> = sqlx::query_as(
            "UPDATE directory_grants SET \
             granted_to = 'user:' || $2::text, \
             redeemed_from = split_part(granted_to, ':', 2)::uuid, \
             redeem_code = NULL, \
             last_modified_at = $3 \
             WHERE id = $1 \
               AND redeemed_from IS NULL \
               AND granted_to LIKE 'placeholder:%' \
             RETURNING *",
        )
        .bind(id)
        .bind(redeemer)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to redeem grant", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let type_rows: Vec<(DirectoryPermission,)> =
            sqlx::query_as("SELECT permission FROM directory_grant_types WHERE grant_id = $1")
                .bind(row.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load grant types", e)
                })?;
        let label_rows: Vec<(String,)> =
            sqlx::query_as("SELECT label FROM directory_grant_labels WHERE grant_id = $1")
                .bind(row.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load grant labels", e)
                })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant redemption", e)
        })?;

        let types: BTreeSet<DirectoryPermission> = type_rows.into_iter().map(|(p,)| p).collect();
        let labels: BTreeSet<String> = label_rows.into_iter().map(|(l,)| l).collect();
        row.into_grant(types, labels).map(Some)
    }
}

/// Raw `system_grants` row before identity parsing.
#[derive(sqlx::FromRow)]
struct SystemGrantRow {
    id: Uuid,
    resource: String,
    granted_to: String,
    granted_by: Uuid,
    begin_at: i64,
    expire_at: i64,
    note: String,
    redeem_code: Option<String>,
    redeemed_from: Option<Uuid>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl SystemGrantRow {
    fn into_grant(
        self,
        permission_types: BTreeSet<SystemPermission>,
        labels: BTreeSet<String>,
    ) -> AppResult<SystemGrant> {
        let resource: SystemResource = self.resource.parse().map_err(|e: AppError| {
            AppError::new(
                ErrorKind::Database,
                format!("Corrupt resource id in grant {}: {}", self.id, e.message),
            )
        })?;
        let granted_to: GranteeIdentity = self.granted_to.parse().map_err(|e: AppError| {
            AppError::new(
                ErrorKind::Database,
                format!("Corrupt grantee id in grant {}: {}", self.id, e.message),
            )
        })?;

        Ok(SystemGrant {
            id: GrantId::from_uuid(self.id),
            resource,
            granted_to,
            granted_by: UserId::from_uuid(self.granted_by),
            permission_types,
            begin_at: self.begin_at,
            expire_at: self.expire_at,
            note: self.note,
            labels,
            redeem_code: self.redeem_code,
            redeemed_from: self.redeemed_from.map(PlaceholderId::from_uuid),
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
        })
    }
}

/// System grant store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgSystemGrantStore {
    pool: PgPool,
}

impl PgSystemGrantStore {
    /// Create a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_assocs(
        &self,
        ids: &[Uuid],
    ) -> AppResult<(
        HashMap<Uuid, BTreeSet<SystemPermission>>,
        HashMap<Uuid, BTreeSet<String>>,
    )> {
        let type_rows: Vec<(Uuid, SystemPermission)> = sqlx::query_as(
            "SELECT grant_id, permission FROM system_grant_types WHERE grant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load grant types", e)
        })?;

        let label_rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT grant_id, label FROM system_grant_labels WHERE grant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load grant labels", e)
        })?;

        let mut types: HashMap<Uuid, BTreeSet<SystemPermission>> = HashMap::new();
        for (grant_id, permission) in type_rows {
            types.entry(grant_id).or_default().insert(permission);
        }
        let mut labels: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for (grant_id, label) in label_rows {
            labels.entry(grant_id).or_default().insert(label);
        }
        Ok((types, labels))
    }

    async fn assemble(&self, rows: Vec<SystemGrantRow>) -> AppResult<Vec<SystemGrant>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let (mut types, mut labels) = self.load_assocs(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let t = types.remove(&row.id).unwrap_or_default();
                let l = labels.remove(&row.id).unwrap_or_default();
                row.into_grant(t, l)
            })
            .collect()
    }
}

#[async_trait]
impl SystemGrantStore for PgSystemGrantStore {
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<SystemGrant>> {
        let row: Option<SystemGrantRow> =
            sqlx::query_as("SELECT * FROM system_grants WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find grant", e)
                })?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_resource(&self, resource: &SystemResource) -> AppResult<Vec<SystemGrant>> {
        let rows: Vec<SystemGrantRow> = sqlx::query_as(
            "SELECT * FROM system_grants WHERE resource = $1 ORDER BY created_at ASC",
        )
        .bind(resource.as_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find grants by resource", e)
        })?;

        self.assemble(rows).await
    }

    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<SystemGrant>> {
        let rows: Vec<SystemGrantRow> = sqlx::query_as(
            "SELECT * FROM system_grants WHERE granted_to = $1 ORDER BY created_at ASC",
        )
        .bind(grantee.as_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find grants by grantee", e)
        })?;

        self.assemble(rows).await
    }

    async fn insert(&self, grant: &SystemGrant) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO system_grants \
             (id, resource, granted_to, granted_by, begin_at, expire_at, note, \
              redeem_code, redeemed_from, created_at, last_modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(grant.id)
        .bind(grant.resource.as_string())
        .bind(grant.granted_to.as_string())
        .bind(grant.granted_by)
        .bind(grant.begin_at)
        .bind(grant.expire_at)
        .bind(&grant.note)
        .bind(&grant.redeem_code)
        .bind(grant.redeemed_from)
        .bind(grant.created_at)
        .bind(grant.last_modified_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert grant", e))?;

        for permission in &grant.permission_types {
            sqlx::query("INSERT INTO system_grant_types (grant_id, permission) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(permission)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant type", e)
                })?;
        }
        for label in &grant.labels {
            sqlx::query("INSERT INTO system_grant_labels (grant_id, label) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(label)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant label", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant insert", e)
        })
    }

    async fn update(&self, grant: &SystemGrant) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "UPDATE system_grants SET \
             resource = $2, granted_to = $3, begin_at = $4, expire_at = $5, note = $6, \
             redeem_code = $7, redeemed_from = $8, last_modified_at = $9 \
             WHERE id = $1",
        )
        .bind(grant.id)
        .bind(grant.resource.as_string())
        .bind(grant.granted_to.as_string())
        .bind(grant.begin_at)
        .bind(grant.expire_at)
        .bind(&grant.note)
        .bind(&grant.redeem_code)
        .bind(grant.redeemed_from)
        .bind(grant.last_modified_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update grant", e))?;

        sqlx::query("DELETE FROM system_grant_types WHERE grant_id = $1")
            .bind(grant.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear grant types", e)
            })?;
        for permission in &grant.permission_types {
            sqlx::query("INSERT INTO system_grant_types (grant_id, permission) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(permission)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant type", e)
                })?;
        }

        sqlx::query("DELETE FROM system_grant_labels WHERE grant_id = $1")
            .bind(grant.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear grant labels", e)
            })?;
        for label in &grant.labels {
            sqlx::query("INSERT INTO system_grant_labels (grant_id, label) VALUES ($1, $2)")
                .bind(grant.id)
                .bind(label)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to insert grant label", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant update", e)
        })
    }

    async fn delete(&self, id: &GrantId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM system_grants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete grant", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SystemGrant>> {
        // Same guarded read-back shape as the directory store.
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let row: Option<SystemGrantRow> = sqlx::query_as(
            "UPDATE system_grants SET \
             granted_to = 'user:' || $2::text, \
             redeemed_from = split_part(granted_to, ':', 2)::uuid, \
             redeem_code = NULL, \
             last_modified_at = $3 \
             WHERE id = $1 \
               AND redeemed_from IS NULL \
               AND granted_to LIKE 'placeholder:%' \
             RETURNING *",
        )
        .bind(id)
        .bind(redeemer)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to redeem grant", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let type_rows: Vec<(SystemPermission,)> =
            sqlx::query_as("SELECT permission FROM system_grant_types WHERE grant_id = $1")
                .bind(row.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load grant types", e)
                })?;
        let label_rows: Vec<(String,)> =
            sqlx::query_as("SELECT label FROM system_grant_labels WHERE grant_id = $1")
                .bind(row.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load grant labels", e)
                })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant redemption", e)
        })?;

        let types: BTreeSet<SystemPermission> = type_rows.into_iter().map(|(p,)| p).collect();
        let labels: BTreeSet<String> = label_rows.into_iter().map(|(l,)| l).collect();
        row.into_grant(types, labels).map(Some)
    }
}
