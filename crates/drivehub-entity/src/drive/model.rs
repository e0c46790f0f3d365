//! Disk, folder, and file metadata models.
//!
//! These are the read-only projections the permission engine needs: parent
//! linkage for the inheritance walk, paths for breadcrumbs, and the
//! sovereign flag that marks an inheritance boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use drivehub_core::types::{DiskId, FileId, FolderId, UserId};

/// A disk: the root of one drive tree within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Disk {
    /// Unique disk identifier.
    pub id: DiskId,
    /// Display name shown in place of the root folder's own name.
    pub name: String,
    /// Path of the disk's root folder.
    pub root_path: String,
    /// When the disk was created.
    pub created_at: DateTime<Utc>,
}

/// Folder metadata, as seen by the permission engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FolderMeta {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The disk this folder resides on.
    pub disk_id: DiskId,
    /// Parent folder (None at a drive root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// Full disk-qualified path.
    pub full_path: String,
    /// Inheritance boundary: ancestor grants do not flow past this folder.
    pub is_sovereign: bool,
    /// The folder owner.
    pub owner_id: UserId,
}

/// File metadata, as seen by the permission engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileMeta {
    /// Unique file identifier.
    pub id: FileId,
    /// The disk this file resides on.
    pub disk_id: DiskId,
    /// Containing folder (None for a file placed at a drive root).
    pub parent_id: Option<FolderId>,
    /// File name.
    pub name: String,
    /// Full disk-qualified path.
    pub full_path: String,
    /// Inheritance boundary: ancestor grants do not reach this file.
    pub is_sovereign: bool,
    /// The file owner.
    pub owner_id: UserId,
}
