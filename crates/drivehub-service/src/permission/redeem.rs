//! Redemption preconditions and redeem-code generation, shared by both
//! grant families.

use rand::Rng;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::GranteeIdentity;

/// Length of generated one-time redeem codes.
pub(crate) const REDEEM_CODE_LEN: usize = 24;

/// Generate a random alphanumeric redeem code.
pub(crate) fn generate_redeem_code() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(REDEEM_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Verify the redemption preconditions, in their fixed order.
///
/// The order matters: a grant whose `redeemed_from` is already set reports
/// `AlreadyRedeemed` even though its grantee is no longer a placeholder,
/// and an expired grant with a correct code reports `GrantExpired`, not a
/// code failure. The caller re-checks the idempotency guard inside the
/// store's atomic write; this check only produces the precise failure kind.
pub(crate) fn check_preconditions(
    granted_to: &GranteeIdentity,
    redeemed_already: bool,
    stored_code: Option<&str>,
    supplied_code: &str,
    begin_at: i64,
    expire_at: i64,
    now_ms: i64,
) -> AppResult<()> {
    if redeemed_already {
        return Err(AppError::already_redeemed("Grant has already been redeemed"));
    }
    if !granted_to.is_placeholder() {
        return Err(AppError::not_redeemable(
            "Grant was not issued to a placeholder",
        ));
    }
    match stored_code {
        Some(code) if code == supplied_code => {}
        _ => return Err(AppError::invalid_redeem_code("Redeem code does not match")),
    }
    if begin_at > 0 && begin_at > now_ms {
        return Err(AppError::not_yet_active("Grant window has not begun"));
    }
    if expire_at >= 0 && expire_at <= now_ms {
        return Err(AppError::expired("Grant window has ended"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::error::ErrorKind;
    use drivehub_core::types::PlaceholderId;

    fn placeholder() -> GranteeIdentity {
        GranteeIdentity::Placeholder(PlaceholderId::new())
    }

    #[test]
    fn test_generated_codes_are_alphanumeric_and_sized() {
        let code = generate_redeem_code();
        assert_eq!(code.len(), REDEEM_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_redeem_code());
    }

    #[test]
    fn test_happy_path_passes() {
        let result = check_preconditions(&placeholder(), false, Some("ABC"), "ABC", 0, -1, 1_000);
        assert!(result.is_ok());
    }

    #[test]
    fn test_already_redeemed_wins_over_grantee_shape() {
        // After redemption the grantee is a user, but the idempotency
        // guard must report AlreadyRedeemed rather than NotRedeemable.
        let user = GranteeIdentity::User(drivehub_core::types::UserId::new());
        let err = check_preconditions(&user, true, None, "ABC", 0, -1, 1_000).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyRedeemed);
    }

    #[test]
    fn test_non_placeholder_is_not_redeemable() {
        let err = check_preconditions(
            &GranteeIdentity::Public,
            false,
            Some("ABC"),
            "ABC",
            0,
            -1,
            1_000,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotRedeemable);
    }

    #[test]
    fn test_wrong_code_rejected() {
        let err =
            check_preconditions(&placeholder(), false, Some("ABC"), "abc", 0, -1, 1_000)
                .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRedeemCode);
    }

    #[test]
    fn test_missing_stored_code_rejected() {
        let err = check_preconditions(&placeholder(), false, None, "ABC", 0, -1, 1_000)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRedeemCode);
    }

    #[test]
    fn test_future_window_not_yet_active() {
        let err = check_preconditions(&placeholder(), false, Some("ABC"), "ABC", 5_000, -1, 1_000)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrantNotYetActive);
    }

    #[test]
    fn test_expired_window_with_correct_code() {
        let err = check_preconditions(&placeholder(), false, Some("ABC"), "ABC", 0, 500, 1_000)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrantExpired);
    }
}
