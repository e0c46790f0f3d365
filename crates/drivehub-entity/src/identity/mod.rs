//! Grantee and resource identity sum types.
//!
//! Every identity serializes to a single prefix-tagged string (for example
//! `user:5b2e...` or `folder:91fa...`) and parses back losslessly. Unknown
//! prefixes are rejected; callers must never coerce a malformed identity
//! into a fallback bucket.

pub mod grantee;
pub mod resource;

pub use grantee::GranteeIdentity;
pub use resource::{DirectoryResource, SystemResource};
