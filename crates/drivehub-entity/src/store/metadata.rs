//! Read-only resource metadata accessor.

use async_trait::async_trait;

use drivehub_core::AppResult;
use drivehub_core::types::{DiskId, FileId, FolderId};

use crate::drive::{Disk, FileMeta, FolderMeta};

/// Lookup of file/folder parent linkage, paths, and the sovereign flag.
///
/// Tables and records need no metadata resolution; only the directory
/// family is hierarchical.
#[async_trait]
pub trait ResourceMetadata: Send + Sync + 'static {
    /// Fetch folder metadata, or `None` if the folder does not exist.
    async fn folder(&self, id: FolderId) -> AppResult<Option<FolderMeta>>;

    /// Fetch file metadata, or `None` if the file does not exist.
    async fn file(&self, id: FileId) -> AppResult<Option<FileMeta>>;

    /// Fetch disk metadata, or `None` if the disk does not exist.
    async fn disk(&self, id: DiskId) -> AppResult<Option<Disk>>;
}
