//! Grant-record meta-authorization.
//!
//! Decides who may see a permission record itself, as opposed to what the
//! record grants. Used to filter list/get results so a requester never
//! sees grants they are not a party to.

use drivehub_core::AppResult;
use drivehub_core::types::UserId;
use drivehub_entity::GranteeIdentity;
use drivehub_entity::store::GroupMembership;

use crate::applicability::grantee_applies;

/// Whether `requester` may view a grant record.
///
/// True for the drive owner and for the granter. A grant issued to a
/// placeholder is visible only to those two — no real identity can match
/// an unredeemed slot. Otherwise the requester must be covered by the
/// record's grantee.
pub async fn can_access_grant_record(
    membership: &dyn GroupMembership,
    requester: &GranteeIdentity,
    granted_to: &GranteeIdentity,
    granted_by: UserId,
    is_owner: bool,
) -> AppResult<bool> {
    if is_owner {
        return Ok(true);
    }
    if requester.as_user() == Some(granted_by) {
        return Ok(true);
    }
    if granted_to.is_placeholder() {
        return Ok(false);
    }
    grantee_applies(membership, granted_to, requester).await
}
