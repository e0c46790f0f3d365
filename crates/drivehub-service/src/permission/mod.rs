//! Grant lifecycle services for the directory and system families.

pub mod directory;
mod redeem;
pub mod system;

pub use directory::{
    CreateDirectoryGrantRequest, DirectoryPermissionService, UpdateDirectoryGrantRequest,
};
pub use system::{CreateSystemGrantRequest, SystemPermissionService, UpdateSystemGrantRequest};
