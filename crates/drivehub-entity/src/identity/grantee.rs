//! Grantee identity: who a permission grant is issued to.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use drivehub_core::AppError;
use drivehub_core::types::{GroupId, PlaceholderId, UserId};

/// The identity class a grant is issued to.
///
/// `Placeholder` is an invite slot reserved for an identity not yet known;
/// it is redeemed into a `User` via a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GranteeIdentity {
    /// Any requester, authenticated or not.
    Public,
    /// A single user.
    User(UserId),
    /// A group of users; applies to every member.
    Group(GroupId),
    /// An unredeemed invite slot.
    Placeholder(PlaceholderId),
}

/// Serialized form of the public grantee.
const PUBLIC_TOKEN: &str = "public";

impl GranteeIdentity {
    /// Format this grantee as its prefix-tagged string form.
    pub fn as_string(&self) -> String {
        match self {
            Self::Public => PUBLIC_TOKEN.to_string(),
            Self::User(id) => format!("user:{id}"),
            Self::Group(id) => format!("group:{id}"),
            Self::Placeholder(id) => format!("placeholder:{id}"),
        }
    }

    /// Whether this grantee is the public class.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Whether this grantee is an unredeemed placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Return the user id if this grantee is a user.
    pub fn as_user(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for GranteeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl FromStr for GranteeIdentity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == PUBLIC_TOKEN {
            return Ok(Self::Public);
        }

        let (prefix, payload) = s
            .split_once(':')
            .ok_or_else(|| AppError::invalid_grantee(format!("Malformed grantee id: '{s}'")))?;

        match prefix {
            "user" => payload
                .parse()
                .map(Self::User)
                .map_err(|_| AppError::invalid_grantee(format!("Invalid user id: '{payload}'"))),
            "group" => payload
                .parse()
                .map(Self::Group)
                .map_err(|_| AppError::invalid_grantee(format!("Invalid group id: '{payload}'"))),
            "placeholder" => payload.parse().map(Self::Placeholder).map_err(|_| {
                AppError::invalid_grantee(format!("Invalid placeholder id: '{payload}'"))
            }),
            _ => Err(AppError::invalid_grantee(format!(
                "Unknown grantee prefix: '{prefix}'"
            ))),
        }
    }
}

impl Serialize for GranteeIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for GranteeIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: AppError| D::Error::custom(e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_variants() {
        let grantees = [
            GranteeIdentity::Public,
            GranteeIdentity::User(UserId::new()),
            GranteeIdentity::Group(GroupId::new()),
            GranteeIdentity::Placeholder(PlaceholderId::new()),
        ];
        for g in grantees {
            let parsed: GranteeIdentity = g.as_string().parse().expect("round-trip parse");
            assert_eq!(parsed, g);
        }
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        let err = "robot:123".parse::<GranteeIdentity>().unwrap_err();
        assert_eq!(err.kind, drivehub_core::ErrorKind::InvalidGranteeFormat);
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert!("user".parse::<GranteeIdentity>().is_err());
    }

    #[test]
    fn test_bad_uuid_payload_rejected() {
        assert!("user:not-a-uuid".parse::<GranteeIdentity>().is_err());
    }

    #[test]
    fn test_serde_as_single_string() {
        let g = GranteeIdentity::Public;
        let json = serde_json::to_string(&g).expect("serialize");
        assert_eq!(json, "\"public\"");
        let back: GranteeIdentity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, g);
    }
}
