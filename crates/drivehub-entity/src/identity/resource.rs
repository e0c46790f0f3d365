//! Resource identities for the two permission families.
//!
//! Directory resources (files, folders) live in a hierarchy and inherit
//! grants; system resources (tables, records) are flat.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use drivehub_core::AppError;
use drivehub_core::types::{FileId, FolderId};

/// A resource in the directory hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectoryResource {
    /// A file (always a leaf in the inheritance chain).
    File(FileId),
    /// A folder (an inheritance node).
    Folder(FolderId),
}

impl DirectoryResource {
    /// Format this resource as its prefix-tagged string form.
    pub fn as_string(&self) -> String {
        match self {
            Self::File(id) => format!("file:{id}"),
            Self::Folder(id) => format!("folder:{id}"),
        }
    }
}

impl fmt::Display for DirectoryResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl FromStr for DirectoryResource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, payload) = s
            .split_once(':')
            .ok_or_else(|| AppError::invalid_resource(format!("Malformed resource id: '{s}'")))?;

        match prefix {
            "file" => payload
                .parse()
                .map(Self::File)
                .map_err(|_| AppError::invalid_resource(format!("Invalid file id: '{payload}'"))),
            "folder" => payload
                .parse()
                .map(Self::Folder)
                .map_err(|_| AppError::invalid_resource(format!("Invalid folder id: '{payload}'"))),
            _ => Err(AppError::invalid_resource(format!(
                "Unknown directory resource prefix: '{prefix}'"
            ))),
        }
    }
}

impl Serialize for DirectoryResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for DirectoryResource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: AppError| D::Error::custom(e.message))
    }
}

/// A flat system resource: a whole table or a single record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemResource {
    /// Every record of a named table.
    Table(String),
    /// A single record, addressed by an opaque identifier.
    Record(String),
}

impl SystemResource {
    /// Format this resource as its prefix-tagged string form.
    pub fn as_string(&self) -> String {
        match self {
            Self::Table(name) => format!("table:{name}"),
            Self::Record(id) => format!("record:{id}"),
        }
    }
}

impl fmt::Display for SystemResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Table names are restricted to lowercase snake_case identifiers.
fn valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for SystemResource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, payload) = s
            .split_once(':')
            .ok_or_else(|| AppError::invalid_resource(format!("Malformed resource id: '{s}'")))?;

        match prefix {
            "table" => {
                if !valid_table_name(payload) {
                    return Err(AppError::invalid_resource(format!(
                        "Invalid table name: '{payload}'"
                    )));
                }
                Ok(Self::Table(payload.to_string()))
            }
            "record" => {
                if payload.is_empty() {
                    return Err(AppError::invalid_resource("Empty record identifier"));
                }
                Ok(Self::Record(payload.to_string()))
            }
            _ => Err(AppError::invalid_resource(format!(
                "Unknown system resource prefix: '{prefix}'"
            ))),
        }
    }
}

impl Serialize for SystemResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for SystemResource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: AppError| D::Error::custom(e.message))
    }
}
