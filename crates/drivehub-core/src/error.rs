//! Unified application error types for DriveHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A grantee identity string could not be parsed.
    InvalidGranteeFormat,
    /// A resource identity string could not be parsed.
    InvalidResourceFormat,
    /// The target file, folder, table, or record does not exist.
    ResourceNotFound,
    /// The referenced permission grant does not exist.
    GrantNotFound,
    /// The supplied redeem code does not match the stored one.
    InvalidRedeemCode,
    /// The grant's grantee is not a placeholder and cannot be redeemed.
    NotRedeemable,
    /// The grant has already been redeemed once.
    AlreadyRedeemed,
    /// The grant's validity window has not begun yet.
    GrantNotYetActive,
    /// The grant's validity window has ended.
    GrantExpired,
    /// The folder ancestry contains a cycle or exceeds the walk bound.
    CorruptHierarchy,
    /// The requester lacks the permission the operation requires.
    PermissionDenied,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// The underlying grant store failed.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGranteeFormat => write!(f, "INVALID_GRANTEE_FORMAT"),
            Self::InvalidResourceFormat => write!(f, "INVALID_RESOURCE_FORMAT"),
            Self::ResourceNotFound => write!(f, "RESOURCE_NOT_FOUND"),
            Self::GrantNotFound => write!(f, "GRANT_NOT_FOUND"),
            Self::InvalidRedeemCode => write!(f, "INVALID_REDEEM_CODE"),
            Self::NotRedeemable => write!(f, "NOT_REDEEMABLE"),
            Self::AlreadyRedeemed => write!(f, "ALREADY_REDEEMED"),
            Self::GrantNotYetActive => write!(f, "GRANT_NOT_YET_ACTIVE"),
            Self::GrantExpired => write!(f, "GRANT_EXPIRED"),
            Self::CorruptHierarchy => write!(f, "CORRUPT_HIERARCHY"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DriveHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire engine boundary; the embedding API layer maps [`ErrorKind`]
/// values to its own surface.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-grantee-format error.
    pub fn invalid_grantee(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidGranteeFormat, message)
    }

    /// Create an invalid-resource-format error.
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResourceFormat, message)
    }

    /// Create a resource-not-found error.
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    /// Create a grant-not-found error.
    pub fn grant_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GrantNotFound, message)
    }

    /// Create an invalid-redeem-code error.
    pub fn invalid_redeem_code(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRedeemCode, message)
    }

    /// Create a not-redeemable error.
    pub fn not_redeemable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotRedeemable, message)
    }

    /// Create an already-redeemed error.
    pub fn already_redeemed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyRedeemed, message)
    }

    /// Create a grant-not-yet-active error.
    pub fn not_yet_active(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GrantNotYetActive, message)
    }

    /// Create a grant-expired error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GrantExpired, message)
    }

    /// Create a corrupt-hierarchy error.
    pub fn corrupt_hierarchy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptHierarchy, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
