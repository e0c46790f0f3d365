//! In-memory implementation of every collaborator trait.
//!
//! Backed by `dashmap`; the redemption compare-and-set runs under the
//! grant's entry lock, so concurrent redeem attempts serialize to at most
//! one winner, matching the PostgreSQL backend's guarded `UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use drivehub_core::types::{DiskId, FileId, FolderId, GrantId, GroupId, UserId};
use drivehub_core::{AppError, AppResult};
use drivehub_entity::store::{
    DirectoryGrantStore, DriveOwner, GroupMembership, ResourceMetadata, SystemGrantStore,
};
use drivehub_entity::{
    Disk, DirectoryGrant, DirectoryResource, FileMeta, FolderMeta, GranteeIdentity, SystemGrant,
    SystemResource,
};

/// Process-local store for one drive tenant.
#[derive(Debug)]
pub struct MemoryStore {
    /// The tenant's owning user.
    owner_id: UserId,
    /// Directory grants by id.
    directory_grants: DashMap<GrantId, DirectoryGrant>,
    /// System grants by id.
    system_grants: DashMap<GrantId, SystemGrant>,
    /// Folder metadata by id.
    folders: DashMap<FolderId, FolderMeta>,
    /// File metadata by id.
    files: DashMap<FileId, FileMeta>,
    /// Disk metadata by id.
    disks: DashMap<DiskId, Disk>,
    /// Group membership pairs.
    memberships: DashMap<(UserId, GroupId), ()>,
}

impl MemoryStore {
    /// Create an empty store owned by `owner_id`.
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            directory_grants: DashMap::new(),
            system_grants: DashMap::new(),
            folders: DashMap::new(),
            files: DashMap::new(),
            disks: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Register a disk.
    pub fn add_disk(&self, disk: Disk) {
        self.disks.insert(disk.id, disk);
    }

    /// Register a folder.
    pub fn add_folder(&self, folder: FolderMeta) {
        self.folders.insert(folder.id, folder);
    }

    /// Register a file.
    pub fn add_file(&self, file: FileMeta) {
        self.files.insert(file.id, file);
    }

    /// Record that `user` belongs to `group`.
    pub fn add_member(&self, user: UserId, group: GroupId) {
        self.memberships.insert((user, group), ());
    }
}

#[async_trait]
impl DriveOwner for MemoryStore {
    async fn owner(&self) -> AppResult<UserId> {
        Ok(self.owner_id)
    }
}

#[async_trait]
impl GroupMembership for MemoryStore {
    async fn is_member(&self, user: UserId, group: GroupId) -> AppResult<bool> {
        Ok(self.memberships.contains_key(&(user, group)))
    }
}

#[async_trait]
impl ResourceMetadata for MemoryStore {
    async fn folder(&self, id: FolderId) -> AppResult<Option<FolderMeta>> {
        Ok(self.folders.get(&id).map(|f| f.clone()))
    }

    async fn file(&self, id: FileId) -> AppResult<Option<FileMeta>> {
        Ok(self.files.get(&id).map(|f| f.clone()))
    }

    async fn disk(&self, id: DiskId) -> AppResult<Option<Disk>> {
        Ok(self.disks.get(&id).map(|d| d.clone()))
    }
}

#[async_trait]
impl DirectoryGrantStore for MemoryStore {
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<DirectoryGrant>> {
        Ok(self.directory_grants.get(id).map(|g| g.clone()))
    }

    async fn find_by_resource(
        &self,
        resource: &DirectoryResource,
    ) -> AppResult<Vec<DirectoryGrant>> {
        Ok(self
            .directory_grants
            .iter()
            .filter(|g| g.resource == *resource)
            .map(|g| g.clone())
            .collect())
    }

    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<DirectoryGrant>> {
        Ok(self
            .directory_grants
            .iter()
            .filter(|g| g.granted_to == *grantee)
            .map(|g| g.clone())
            .collect())
    }

    async fn insert(&self, grant: &DirectoryGrant) -> AppResult<()> {
        if self.directory_grants.contains_key(&grant.id) {
            return Err(AppError::conflict(format!(
                "Directory grant {} already exists",
                grant.id
            )));
        }
        self.directory_grants.insert(grant.id, grant.clone());
        Ok(())
    }

    async fn update(&self, grant: &DirectoryGrant) -> AppResult<()> {
        match self.directory_grants.get_mut(&grant.id) {
            Some(mut entry) => {
                *entry = grant.clone();
                Ok(())
            }
            None => Err(AppError::grant_not_found(format!(
                "Directory grant {} not found",
                grant.id
            ))),
        }
    }

    async fn delete(&self, id: &GrantId) -> AppResult<bool> {
        Ok(self.directory_grants.remove(id).is_some())
    }

    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<DirectoryGrant>> {
        let Some(mut entry) = self.directory_grants.get_mut(id) else {
            return Ok(None);
        };
        // Guard re-checked under the entry lock.
        if entry.redeemed_from.is_some() {
            return Ok(None);
        }
        let GranteeIdentity::Placeholder(placeholder) = entry.granted_to else {
            return Ok(None);
        };
        entry.granted_to = GranteeIdentity::User(redeemer);
        entry.redeem_code = None;
        entry.redeemed_from = Some(placeholder);
        entry.last_modified_at = at;
        Ok(Some(entry.clone()))
    }
}

#[async_trait]
impl SystemGrantStore for MemoryStore {
    async fn find_by_id(&self, id: &GrantId) -> AppResult<Option<SystemGrant>> {
        Ok(self.system_grants.get(id).map(|g| g.clone()))
    }

    async fn find_by_resource(&self, resource: &SystemResource) -> AppResult<Vec<SystemGrant>> {
        Ok(self
            .system_grants
            .iter()
            .filter(|g| g.resource == *resource)
            .map(|g| g.clone())
            .collect())
    }

    async fn find_by_grantee(&self, grantee: &GranteeIdentity) -> AppResult<Vec<SystemGrant>> {
        Ok(self
            .system_grants
            .iter()
            .filter(|g| g.granted_to == *grantee)
            .map(|g| g.clone())
            .collect())
    }

    async fn insert(&self, grant: &SystemGrant) -> AppResult<()> {
        if self.system_grants.contains_key(&grant.id) {
            return Err(AppError::conflict(format!(
                "System grant {} already exists",
                grant.id
            )));
        }
        self.system_grants.insert(grant.id, grant.clone());
        Ok(())
    }

    async fn update(&self, grant: &SystemGrant) -> AppResult<()> {
        match self.system_grants.get_mut(&grant.id) {
            Some(mut entry) => {
                *entry = grant.clone();
                Ok(())
            }
            None => Err(AppError::grant_not_found(format!(
                "System grant {} not found",
                grant.id
            ))),
        }
    }

    async fn delete(&self, id: &GrantId) -> AppResult<bool> {
        Ok(self.system_grants.remove(id).is_some())
    }

    async fn mark_redeemed(
        &self,
        id: &GrantId,
        redeemer: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SystemGrant>> {
        let Some(mut entry) = self.system_grants.get_mut(id) else {
            return Ok(None);
        };
        if entry.redeemed_from.is_some() {
            return Ok(None);
        }
        let GranteeIdentity::Placeholder(placeholder) = entry.granted_to else {
            return Ok(None);
        };
        entry.granted_to = GranteeIdentity::User(redeemer);
        entry.redeem_code = None;
        entry.redeemed_from = Some(placeholder);
        entry.last_modified_at = at;
        Ok(Some(entry.clone()))
    }
}
