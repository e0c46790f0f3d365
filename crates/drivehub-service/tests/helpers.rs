//! Shared test fixtures for the lifecycle services.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use drivehub_core::types::{DiskId, FileId, FolderId, UserId};
use drivehub_entity::drive::{Disk, FileMeta, FolderMeta};
use drivehub_entity::{DirectoryPermission, DirectoryResource, GranteeIdentity, SystemPermission};
use drivehub_service::{
    CreateDirectoryGrantRequest, CreateSystemGrantRequest, DirectoryPermissionService,
    RequestContext, SystemPermissionService,
};
use drivehub_store::MemoryStore;

/// One disk, one folder, one file, both lifecycle services wired to a
/// shared in-memory store.
pub struct TestHub {
    pub store: Arc<MemoryStore>,
    pub owner: UserId,
    pub folder: FolderId,
    pub file: FileId,
    pub directory: DirectoryPermissionService,
    pub system: SystemPermissionService,
}

impl TestHub {
    pub fn new() -> Self {
        let owner = UserId::new();
        let store = Arc::new(MemoryStore::new(owner));

        let disk = DiskId::new();
        store.add_disk(Disk {
            id: disk,
            name: "Main Drive".to_string(),
            root_path: "disk::main".to_string(),
            created_at: Utc::now(),
        });

        let folder = FolderId::new();
        store.add_folder(FolderMeta {
            id: folder,
            disk_id: disk,
            parent_id: None,
            name: "main".to_string(),
            full_path: "disk::main".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let file = FileId::new();
        store.add_file(FileMeta {
            id: file,
            disk_id: disk,
            parent_id: Some(folder),
            name: "report.pdf".to_string(),
            full_path: "disk::main/report.pdf".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let directory = DirectoryPermissionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let system =
            SystemPermissionService::new(store.clone(), store.clone(), store.clone());

        Self {
            store,
            owner,
            folder,
            file,
            directory,
            system,
        }
    }

    pub fn owner_ctx(&self) -> RequestContext {
        RequestContext::new(self.owner)
    }
}

/// A create request for the given grantee with VIEW only and defaults.
pub fn view_request(
    resource: DirectoryResource,
    granted_to: GranteeIdentity,
) -> CreateDirectoryGrantRequest {
    CreateDirectoryGrantRequest {
        id: None,
        resource,
        granted_to,
        permission_types: [DirectoryPermission::View].into_iter().collect(),
        begin_at: None,
        expire_at: None,
        inheritable: true,
        note: None,
        labels: BTreeSet::new(),
    }
}

/// A system create request for the given grantee with VIEW only.
pub fn system_view_request(
    resource: drivehub_entity::SystemResource,
    granted_to: GranteeIdentity,
) -> CreateSystemGrantRequest {
    CreateSystemGrantRequest {
        id: None,
        resource,
        granted_to,
        permission_types: [SystemPermission::View].into_iter().collect(),
        begin_at: None,
        expire_at: None,
        note: None,
        labels: BTreeSet::new(),
    }
}
