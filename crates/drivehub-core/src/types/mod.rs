//! Shared primitive types.

pub mod id;
pub mod time;

pub use id::{DiskId, FileId, FolderId, GrantId, GroupId, PlaceholderId, UserId};
pub use time::now_ms;
