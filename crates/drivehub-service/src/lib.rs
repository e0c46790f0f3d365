//! # drivehub-service
//!
//! Permission lifecycle services for DriveHub. Each service orchestrates
//! the grant stores, metadata accessors, and evaluators to implement the
//! create/update/delete/redeem use cases and record-visibility filtering.
//!
//! Services follow constructor injection — all collaborators are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod permission;

pub use context::RequestContext;
pub use permission::{
    CreateDirectoryGrantRequest, CreateSystemGrantRequest, DirectoryPermissionService,
    SystemPermissionService, UpdateDirectoryGrantRequest, UpdateSystemGrantRequest,
};
