//! # drivehub-authz
//!
//! Permission resolution for DriveHub: given a resource and a requester
//! identity, compute the exact set of actions the requester may perform.
//!
//! ## Modules
//!
//! - `applicability` — does a grant's grantee apply to a requester
//! - `chain` — ancestor-chain construction with sovereign boundaries
//! - `evaluator` — directory and system permission evaluators
//! - `breadcrumb` — per-node visibility and permission-filtered trails
//! - `record` — who may see a grant record itself
//!
//! Evaluation is read-only and side-effect-free; every call re-reads the
//! current grants, takes an explicit `as_of_ms` instant, and is safe to
//! run concurrently without locking.

pub mod applicability;
pub mod breadcrumb;
pub mod chain;
pub mod evaluator;
pub mod record;

pub use applicability::grantee_applies;
pub use breadcrumb::BreadcrumbDeriver;
pub use chain::{ChainNode, ChainWalker, MAX_CHAIN_DEPTH};
pub use evaluator::{DirectoryPermissionEvaluator, SystemPermissionEvaluator};
pub use record::can_access_grant_record;
