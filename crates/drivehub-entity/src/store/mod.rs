//! Collaborator traits the engine consumes.
//!
//! The engine treats persistence as a black box: grants, resource
//! metadata, group membership, and the drive owner are reached through
//! these traits, implemented by `drivehub-store` (PostgreSQL and
//! in-memory backends) and consumed as `Arc<dyn Trait>`.

pub mod grants;
pub mod membership;
pub mod metadata;
pub mod owner;

pub use grants::{DirectoryGrantStore, SystemGrantStore};
pub use membership::GroupMembership;
pub use metadata::ResourceMetadata;
pub use owner::DriveOwner;
