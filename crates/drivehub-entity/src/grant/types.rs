//! Permission type enumerations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use drivehub_core::AppError;

/// Actions grantable on a directory resource (file or folder).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "directory_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DirectoryPermission {
    /// Read the resource and its listing.
    View,
    /// Add new files under the resource.
    Upload,
    /// Modify content and metadata.
    Edit,
    /// Remove the resource or its children.
    Delete,
    /// Issue further grants of same or lower scope.
    Invite,
    /// Full control over the resource.
    Manage,
}

impl DirectoryPermission {
    /// The complete directory permission set (used for the owner bypass).
    pub fn all() -> BTreeSet<Self> {
        BTreeSet::from([
            Self::View,
            Self::Upload,
            Self::Edit,
            Self::Delete,
            Self::Invite,
            Self::Manage,
        ])
    }

    /// Whether this action can change the resource's content or children.
    pub fn is_modify(&self) -> bool {
        matches!(self, Self::Upload | Self::Edit | Self::Delete | Self::Manage)
    }

    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Upload => "upload",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Invite => "invite",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for DirectoryPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DirectoryPermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "upload" => Ok(Self::Upload),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "invite" => Ok(Self::Invite),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::validation(format!(
                "Invalid directory permission: '{s}'"
            ))),
        }
    }
}

/// Actions grantable on a system resource (table or record).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "system_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SystemPermission {
    /// Read records.
    View,
    /// Insert new records.
    Create,
    /// Modify existing records.
    Edit,
    /// Remove records.
    Delete,
    /// Issue further grants.
    Invite,
}

impl SystemPermission {
    /// The complete system permission set (used for the owner bypass).
    pub fn all() -> BTreeSet<Self> {
        BTreeSet::from([
            Self::View,
            Self::Create,
            Self::Edit,
            Self::Delete,
            Self::Invite,
        ])
    }

    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Invite => "invite",
        }
    }
}

impl fmt::Display for SystemPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SystemPermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "invite" => Ok(Self::Invite),
            _ => Err(AppError::validation(format!(
                "Invalid system permission: '{s}'"
            ))),
        }
    }
}
