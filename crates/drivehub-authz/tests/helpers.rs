//! Shared test fixtures for permission resolution tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use drivehub_authz::{BreadcrumbDeriver, DirectoryPermissionEvaluator, SystemPermissionEvaluator};
use drivehub_core::types::{DiskId, FileId, FolderId, GrantId, UserId};
use drivehub_entity::drive::{Disk, FileMeta, FolderMeta};
use drivehub_entity::{
    DirectoryGrant, DirectoryPermission, DirectoryResource, GranteeIdentity, SystemGrant,
    SystemPermission, SystemResource,
};
use drivehub_store::MemoryStore;

/// An instant comfortably inside every default grant window.
pub const NOW_MS: i64 = 1_700_000_000_000;

/// One disk with two subtrees:
///
/// ```text
/// main (root)
/// ├── projects (sovereign)
/// │   └── reports
/// │       └── q3.pdf
/// └── docs
///     └── notes.txt
/// ```
pub struct TestDrive {
    pub store: Arc<MemoryStore>,
    pub owner: UserId,
    pub disk: DiskId,
    pub root: FolderId,
    pub projects: FolderId,
    pub reports: FolderId,
    pub q3: FileId,
    pub docs: FolderId,
    pub notes: FileId,
}

impl TestDrive {
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

        let root = FolderId::new();
        store.add_folder(FolderMeta {
            id: root,
            disk_id: disk,
            parent_id: None,
            name: "main".to_string(),
            full_path: "disk::main".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let projects = FolderId::new();
        store.add_folder(FolderMeta {
            id: projects,
            disk_id: disk,
            parent_id: Some(root),
            name: "projects".to_string(),
            full_path: "disk::main/projects".to_string(),
            is_sovereign: true,
            owner_id: owner,
        });

        let reports = FolderId::new();
        store.add_folder(FolderMeta {
            id: reports,
            disk_id: disk,
            parent_id: Some(projects),
            name: "reports".to_string(),
            full_path: "disk::main/projects/reports".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let q3 = FileId::new();
        store.add_file(FileMeta {
            id: q3,
            disk_id: disk,
            parent_id: Some(reports),
            name: "q3.pdf".to_string(),
            full_path: "disk::main/projects/reports/q3.pdf".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let docs = FolderId::new();
        store.add_folder(FolderMeta {
            id: docs,
            disk_id: disk,
            parent_id: Some(root),
            name: "docs".to_string(),
            full_path: "disk::main/docs".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        let notes = FileId::new();
        store.add_file(FileMeta {
            id: notes,
            disk_id: disk,
            parent_id: Some(docs),
            name: "notes.txt".to_string(),
            full_path: "disk::main/docs/notes.txt".to_string(),
            is_sovereign: false,
            owner_id: owner,
        });

        Self {
            store,
            owner,
            disk,
            root,
            projects,
            reports,
            q3,
            docs,
            notes,
        }
    }

    pub async fn insert_directory(&self, grant: DirectoryGrant) {
        drivehub_entity::store::DirectoryGrantStore::insert(self.store.as_ref(), &grant)
            .await
            .expect("insert directory grant");
    }

    pub async fn insert_system(&self, grant: SystemGrant) {
        drivehub_entity::store::SystemGrantStore::insert(self.store.as_ref(), &grant)
            .await
            .expect("insert system grant");
    }

    pub fn directory_evaluator(&self) -> DirectoryPermissionEvaluator {
        DirectoryPermissionEvaluator::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    pub fn system_evaluator(&self) -> SystemPermissionEvaluator {
        SystemPermissionEvaluator::new(self.store.clone(), self.store.clone(), self.store.clone())
    }

    pub fn breadcrumb_deriver(&self) -> BreadcrumbDeriver {
        BreadcrumbDeriver::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }
}

/// A directory grant with an always-open window.
pub fn directory_grant(
    resource: DirectoryResource,
    granted_to: GranteeIdentity,
    types: &[DirectoryPermission],
    inheritable: bool,
) -> DirectoryGrant {
    let now = Utc::now();
    DirectoryGrant {
        id: GrantId::new(),
        resource,
        resource_path: String::new(),
        granted_to,
        granted_by: UserId::new(),
        permission_types: types.iter().copied().collect::<BTreeSet<_>>(),
        begin_at: 0,
        expire_at: -1,
        inheritable,
        note: String::new(),
        labels: BTreeSet::new(),
        redeem_code: None,
        redeemed_from: None,
        created_at: now,
        last_modified_at: now,
    }
}

/// A system grant with an always-open window.
pub fn system_grant(
    resource: SystemResource,
    granted_to: GranteeIdentity,
    types: &[SystemPermission],
) -> SystemGrant {
    let now = Utc::now();
    SystemGrant {
        id: GrantId::new(),
        resource,
        granted_to,
        granted_by: UserId::new(),
        permission_types: types.iter().copied().collect::<BTreeSet<_>>(),
        begin_at: 0,
        expire_at: -1,
        note: String::new(),
        labels: BTreeSet::new(),
        redeem_code: None,
        redeemed_from: None,
        created_at: now,
        last_modified_at: now,
    }
}
