//! # Credit Expiry
//!
//! A credit is expired once strictly more than `validity_days` whole days
//! have passed since production. The check is advisory: it never changes
//! credit state.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use hycred_core::{Timestamp, SECONDS_PER_DAY};

/// Default validity window.
pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

/// Validity window applied to production dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    pub validity_days: u32,
}

impl ExpiryPolicy {
    /// A policy with the given window.
    pub fn new(validity_days: u32) -> Self {
        Self { validity_days }
    }

    /// Window length in seconds.
    pub fn window_secs(&self) -> i64 {
        i64::from(self.validity_days) * SECONDS_PER_DAY
    }

    /// `now − production > window`.
    pub fn is_expired(&self, production: Timestamp, now: Timestamp) -> bool {
        now.seconds_since(&production) > self.window_secs()
    }

    /// The last instant at which a credit produced at `production` is still valid.
    pub fn valid_until(&self, production: Timestamp) -> Option<Timestamp> {
        production.checked_add(Duration::seconds(self.window_secs()))
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY_DAYS)
    }
}
