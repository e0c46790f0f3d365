//! # drivehub-entity
//!
//! Domain entity models for the DriveHub permission engine: grantee and
//! resource identities, permission grants, drive metadata, and visibility
//! value objects. Also defines the collaborator traits (grant store,
//! resource metadata, group membership, drive owner) that the storage
//! layer implements and the engine consumes.

pub mod drive;
pub mod grant;
pub mod identity;
pub mod store;

pub use drive::{Breadcrumb, Disk, FileMeta, FolderMeta, VisibilityLabel, VisibilitySummary};
pub use grant::{DirectoryGrant, DirectoryPermission, SystemGrant, SystemPermission};
pub use identity::{DirectoryResource, GranteeIdentity, SystemResource};
