//! Bearer token with a known expiry.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// A bearer token and the instant it stops being accepted.
///
/// Value and expiry always travel together; a refresh replaces the whole
/// struct.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires at `expires_at`.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Creates a token issued at `issued_at` that lives for `expires_in_secs`.
    #[must_use]
    pub fn issued(value: impl Into<String>, issued_at: DateTime<Utc>, expires_in_secs: i64) -> Self {
        let expires_at = issued_at
            .checked_add_signed(chrono::Duration::seconds(expires_in_secs))
            .unwrap_or(issued_at);
        Self::new(value, expires_at)
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true while `now + margin` is strictly before the expiry.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let margin = chrono::Duration::from_std(margin).unwrap_or(chrono::Duration::MAX);
        now.checked_add_signed(margin)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
