//! Idle-timeout policy
//!
//! Expiry is always recomputed from the persisted last-activity stamp; there
//! is no session token. All functions take the current time explicitly so
//! callers (and tests) own the clock.

use serde::{Deserialize, Serialize};

use crate::AUTO_LOCK_OPTIONS;

/// Milliseconds per minute
const MINUTE_MS: u64 = 60_000;

/// Auto-lock policy: a session expires after this many minutes of inactivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLock {
    /// Timeout in minutes
    pub minutes: u32,
}

impl AutoLock {
    pub fn new(minutes: u32) -> Self {
        Self { minutes }
    }

    /// Whether `minutes` is one of the values the settings UI offers
    pub fn is_allowed_option(minutes: u32) -> bool {
        AUTO_LOCK_OPTIONS.contains(&minutes)
    }

    /// The timeout window in milliseconds
    pub fn window_ms(&self) -> u64 {
        self.minutes as u64 * MINUTE_MS
    }

    /// Check whether a session stamped at `last_activity_ms` has expired.
    ///
    /// The boundary is inclusive: elapsed time exactly equal to the window
    /// counts as expired. A clock that moved backwards reads as elapsed 0.
    pub fn is_expired(&self, last_activity_ms: u64, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(last_activity_ms);
        elapsed >= self.window_ms()
    }

    /// Milliseconds left in the idle window (0 once expired)
    pub fn remaining_ms(&self, last_activity_ms: u64, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(last_activity_ms);
        self.window_ms().saturating_sub(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_allowed_options() {
        for minutes in AUTO_LOCK_OPTIONS {
            assert!(AutoLock::is_allowed_option(minutes));
        }
        assert!(!AutoLock::is_allowed_option(0));
        assert!(!AutoLock::is_allowed_option(2));
        assert!(!AutoLock::is_allowed_option(120));
    }

    #[rstest]
    #[case(5, 4 * MINUTE_MS, false)]
    #[case(5, 5 * MINUTE_MS - 1, false)]
    #[case(5, 5 * MINUTE_MS, true)]
    #[case(5, 6 * MINUTE_MS, true)]
    #[case(1, MINUTE_MS, true)]
    #[case(60, 59 * MINUTE_MS, false)]
    fn test_expiry_boundary(#[case] minutes: u32, #[case] elapsed: u64, #[case] expired: bool) {
        let policy = AutoLock::new(minutes);
        let last = 1_700_000_000_000u64;
        assert_eq!(policy.is_expired(last, last + elapsed), expired);
    }

    #[test]
    fn test_clock_regression_reads_as_fresh() {
        let policy = AutoLock::new(5);
        let last = 1_700_000_000_000u64;
        assert!(!policy.is_expired(last, last - 10_000));
        assert_eq!(policy.remaining_ms(last, last - 10_000), policy.window_ms());
    }

    #[test]
    fn test_remaining_window() {
        let policy = AutoLock::new(5);
        let last = 1_700_000_000_000u64;
        assert_eq!(policy.remaining_ms(last, last), 5 * MINUTE_MS);
        assert_eq!(policy.remaining_ms(last, last + MINUTE_MS), 4 * MINUTE_MS);
        assert_eq!(policy.remaining_ms(last, last + 6 * MINUTE_MS), 0);
    }
}
