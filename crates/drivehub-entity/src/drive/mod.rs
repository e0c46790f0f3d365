//! Drive metadata entities and visibility value objects.

pub mod model;
pub mod visibility;

pub use model::{Disk, FileMeta, FolderMeta};
pub use visibility::{Breadcrumb, VisibilityLabel, VisibilitySummary};
