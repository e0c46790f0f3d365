//! Resource metadata lookups over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::types::{DiskId, FileId, FolderId};
use drivehub_entity::drive::{Disk, FileMeta, FolderMeta};
use drivehub_entity::store::ResourceMetadata;

/// Metadata accessor backed by the `disks`, `folders`, and `files` tables.
#[derive(Debug, Clone)]
pub struct PgResourceMetadata {
    pool: PgPool,
}

impl PgResourceMetadata {
    /// Create a new accessor over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceMetadata for PgResourceMetadata {
    async fn folder(&self, id: FolderId) -> AppResult<Option<FolderMeta>> {
        sqlx::query_as::<_, FolderMeta>(
            "SELECT id, disk_id, parent_id, name, full_path, is_sovereign, owner_id \
             FROM folders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load folder", e))
    }

    async fn file(&self, id: FileId) -> AppResult<Option<FileMeta>> {
        sqlx::query_as::<_, FileMeta>(
            "SELECT id, disk_id, parent_id, name, full_path, is_sovereign, owner_id \
             FROM files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load file", e))
    }

    async fn disk(&self, id: DiskId) -> AppResult<Option<Disk>> {
        sqlx::query_as::<_, Disk>(
            "SELECT id, name, root_path, created_at FROM disks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load disk", e))
    }
}
