//! Permission grant entities for the directory and system families.

pub mod model;
pub mod types;

pub use model::{DirectoryGrant, SystemGrant};
pub use types::{DirectoryPermission, SystemPermission};
