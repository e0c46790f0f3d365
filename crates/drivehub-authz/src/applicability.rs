//! Grantee applicability: does a grant issued to `granted_to` cover a
//! given requester identity?
//!
//! Shared by both evaluators and by grant-record meta-authorization.

use drivehub_entity::GranteeIdentity;
use drivehub_entity::store::GroupMembership;

use drivehub_core::AppResult;

/// Test whether a grant to `granted_to` applies to `requester`.
///
/// - `Public` applies to any requester.
/// - `User(x)` applies only to the exact user `x`.
/// - `Group(g)` applies to a user who is a member of `g`, or to the
///   group identity itself (used when checking a group's own standing).
/// - `Placeholder(p)` applies only to the exact placeholder `p`; ordinary
///   users never satisfy it.
pub async fn grantee_applies(
    membership: &dyn GroupMembership,
    granted_to: &GranteeIdentity,
    requester: &GranteeIdentity,
) -> AppResult<bool> {
    match (granted_to, requester) {
        (GranteeIdentity::Public, _) => Ok(true),
        (GranteeIdentity::User(granted), GranteeIdentity::User(asking)) => Ok(granted == asking),
        (GranteeIdentity::Group(group), GranteeIdentity::User(user)) => {
            membership.is_member(*user, *group).await
        }
        (GranteeIdentity::Group(granted), GranteeIdentity::Group(asking)) => Ok(granted == asking),
        (GranteeIdentity::Placeholder(granted), GranteeIdentity::Placeholder(asking)) => {
            Ok(granted == asking)
        }
        _ => Ok(false),
    }
}
