// src/services/lockout.rs

use chrono::{DateTime, Duration, Utc};

/// Login throttling: after `max_failures` consecutive failures the account is
/// locked for `lockout`.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_failures: i32,
    pub lockout: Duration,
}

/// Counter values stored after a failed login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct FailedLogin {
    pub failed_login_attempts: i32,
    pub lockout_until: Option<DateTime<Utc>>,
}

impl LockoutPolicy {
    pub fn new(max_failures: i32, lockout_minutes: i64) -> Self {
        Self {
            max_failures,
            lockout: Duration::minutes(lockout_minutes),
        }
    }

    pub fn is_locked(&self, lockout_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        lockout_until.is_some_and(|until| until > now)
    }

    /// True once `failed_login_attempts` consecutive failures must lock the
    /// account. The counter is not reset when a lock expires, so the first
    /// failure after an expired lock locks the account again.
    pub fn locks_after(&self, failed_login_attempts: i32) -> bool {
        failed_login_attempts >= self.max_failures
    }

    /// End of a lock that starts at `now`.
    pub fn lock_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lockout
    }
}
