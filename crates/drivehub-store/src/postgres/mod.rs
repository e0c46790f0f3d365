//! PostgreSQL backend.

pub mod connection;
pub mod grants;
pub mod metadata;
pub mod migration;
pub mod tenant;

pub use connection::DatabasePool;
pub use grants::{PgDirectoryGrantStore, PgSystemGrantStore};
pub use metadata::PgResourceMetadata;
pub use tenant::{PgDriveOwner, PgGroupMembership};
