//! # drivehub-core
//!
//! Core crate for the DriveHub permission engine. Contains the unified
//! error system, typed identifiers, and configuration schemas.
//!
//! This crate has **no** internal dependencies on other DriveHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
