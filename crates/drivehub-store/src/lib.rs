//! # drivehub-store
//!
//! Implementations of the DriveHub collaborator traits:
//!
//! - `postgres` — the production backend over sqlx/PostgreSQL. Grant
//!   rows and their permission-type and label rows are written inside one
//!   transaction; placeholder redemption is a single guarded `UPDATE`.
//! - `memory` — a process-local backend over `dashmap`, used by the
//!   engine's test suites and by embedders that do not need persistence.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::DatabasePool;
