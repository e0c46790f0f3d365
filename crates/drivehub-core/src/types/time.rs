//! Epoch-millisecond clock helpers.
//!
//! Grant validity windows are expressed as epoch milliseconds with sentinel
//! values (`begin_at <= 0` means active from the start, `expire_at < 0`
//! means never expires). Evaluators take an explicit `as_of_ms` parameter
//! so they stay pure; this helper exists for the callers that supply it.

use chrono::Utc;

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
