//! Failed-attempt lockout state machine.
//!
//! An account is either Unlocked (`lock_until` absent or elapsed) or Locked
//! (`lock_until` in the future). The attempt counter moves only through the
//! store's atomic operations; this module holds the policy defaults and the
//! gate evaluated before any verification attempt.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Consecutive mismatches before the account locks.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays unusable.
pub const LOCK_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked { until: DateTime<Utc> },
}

/// Evaluate the lock gate for an account at `now`.
#[must_use]
pub fn lock_state(lock_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> LockState {
    match lock_until {
        Some(until) if until > now => LockState::Locked { until },
        _ => LockState::Unlocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn absent_lock_is_unlocked() {
        assert_eq!(lock_state(None, Utc::now()), LockState::Unlocked);
    }

    #[test]
    fn elapsed_lock_is_unlocked() {
        let now = Utc::now();
        let past = now - ChronoDuration::seconds(1);
        assert_eq!(lock_state(Some(past), now), LockState::Unlocked);
    }

    #[test]
    fn future_lock_is_locked_with_expiry() {
        let now = Utc::now();
        let until = now + ChronoDuration::seconds(30);
        assert_eq!(
            lock_state(Some(until), now),
            LockState::Locked { until }
        );
    }
}
