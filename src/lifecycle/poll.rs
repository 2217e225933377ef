//! Wait policy between report status checks.
//!
//! After each status check that neither completed nor failed the report, the
//! orchestrator asks [`PollPolicy::after_attempt`] whether to wait and try
//! again or give up. Gateway errors seen while polling are first run through
//! [`classify_poll_error`]: transient ones count as an ordinary unsuccessful
//! attempt, permanent ones end polling at once.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ledger_report_core::lifecycle::{PollDecision, PollPolicy};
//!
//! let policy = PollPolicy::default();
//! match policy.after_attempt(1) {
//!     PollDecision::Wait { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(5));
//!         assert_eq!(attempt, 2);
//!     }
//!     PollDecision::GiveUp { reason } => panic!("gave up early: {reason}"),
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use crate::constants::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::gateway::GatewayError;

/// Default backoff multiplier for [`Backoff::Exponential`] (doubles each attempt).
pub const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Default delay cap for [`Backoff::Exponential`] (60 seconds).
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Maximum jitter added to exponential delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// How the wait between status checks evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same interval before every retry.
    Fixed,
    /// `interval * multiplier^(attempt-1)`, capped at `max_delay`, plus up to
    /// 500ms of random jitter.
    Exponential {
        /// Growth factor per attempt.
        multiplier: f32,
        /// Upper bound before jitter.
        max_delay: Duration,
    },
}

impl Backoff {
    /// Exponential backoff with the default multiplier and cap.
    #[must_use]
    pub fn exponential() -> Self {
        Self::Exponential {
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Classification of a gateway error observed while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollFailure {
    /// May succeed on the next check (network trouble, non-200 status).
    Transient,
    /// Will not get better by asking again (malformed body, unusable URL).
    Permanent,
}

/// Decision taken after an unsuccessful status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// Wait, then perform another status check.
    Wait {
        /// How long to wait.
        delay: Duration,
        /// Number of the check that follows the wait (1-indexed).
        attempt: u32,
    },
    /// Stop polling.
    GiveUp {
        /// Human-readable reason.
        reason: String,
    },
}

/// Attempt cap and wait schedule for status polling.
///
/// # Default Values
///
/// - `max_attempts`: 10
/// - `interval`: 5 seconds
/// - `backoff`: [`Backoff::Fixed`]
///
/// With defaults a report that never completes costs 10 status calls and
/// 9 waits of 5 seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    max_attempts: u32,
    interval: Duration,
    backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollPolicy {
    /// Creates a policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            backoff,
        }
    }

    /// Fixed-interval policy.
    #[must_use]
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self::new(max_attempts, interval, Backoff::Fixed)
    }

    /// Returns the maximum number of status checks.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base wait interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the backoff mode.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Decides what follows unsuccessful check number `attempt` (1-indexed).
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn after_attempt(&self, attempt: u32) -> PollDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, "max poll attempts reached");
            return PollDecision::GiveUp {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.delay_for(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will poll again"
        );

        PollDecision::Wait {
            delay,
            attempt: attempt + 1,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                multiplier,
                max_delay,
            } => {
                let base_ms = self.interval.as_millis() as f64;
                let exponent = f64::from(attempt.saturating_sub(1));
                let delay_ms = base_ms * f64::from(multiplier).powf(exponent);
                let capped_ms = delay_ms.min(max_delay.as_millis() as f64);
                Duration::from_millis(capped_ms as u64) + jitter()
            }
        }
    }
}

fn jitter() -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=MAX_JITTER.as_millis() as u64))
}

/// Classifies a gateway error seen during polling.
///
/// | Error | Type | Rationale |
/// |-------|------|-----------|
/// | NonOkStatus | Transient | Gateway hiccup; the job may still be running |
/// | Transport | Transient | Network may recover |
/// | MalformedResponse | Permanent | Shape will not change on retry |
/// | InvalidUrl | Permanent | Won't succeed |
#[must_use]
pub fn classify_poll_error(error: &GatewayError) -> PollFailure {
    match error {
        GatewayError::NonOkStatus { .. } | GatewayError::Transport { .. } => PollFailure::Transient,
        GatewayError::MalformedResponse { .. } | GatewayError::InvalidUrl { .. } => {
            PollFailure::Permanent
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_policy_default_values() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.interval(), Duration::from_secs(5));
        assert_eq!(policy.backoff(), Backoff::Fixed);
    }

    #[test]
    fn test_poll_policy_max_attempts_minimum_is_one() {
        let policy = PollPolicy::fixed(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert!(matches!(policy.after_attempt(1), PollDecision::GiveUp { .. }));
    }

    #[test]
    fn test_fixed_policy_waits_same_interval() {
        let policy = PollPolicy::fixed(10, Duration::from_secs(5));
        for attempt in 1..10 {
            assert_eq!(
                policy.after_attempt(attempt),
                PollDecision::Wait {
                    delay: Duration::from_secs(5),
                    attempt: attempt + 1
                }
            );
        }
    }

    #[test]
    fn test_policy_gives_up_at_max_attempts() {
        let policy = PollPolicy::fixed(3, Duration::from_secs(5));
        assert!(matches!(policy.after_attempt(2), PollDecision::Wait { .. }));
        let decision = policy.after_attempt(3);
        if let PollDecision::GiveUp { reason } = decision {
            assert!(reason.contains("exhausted"));
        } else {
            panic!("Expected GiveUp, got {decision:?}");
        }
    }

    #[test]
    fn test_exponential_delay_grows_and_caps() {
        let policy = PollPolicy::new(
            10,
            Duration::from_secs(1),
            Backoff::Exponential {
                multiplier: 2.0,
                max_delay: Duration::from_secs(5),
            },
        );

        let first = policy.delay_for(1);
        assert!(first >= Duration::from_secs(1) && first <= Duration::from_millis(1500));

        let third = policy.delay_for(3);
        assert!(third >= Duration::from_secs(4) && third <= Duration::from_millis(4500));

        let capped = policy.delay_for(8);
        assert!(capped >= Duration::from_secs(5) && capped <= Duration::from_millis(5500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            assert!(jitter() <= MAX_JITTER);
        }
    }

    #[test]
    fn test_classify_non_ok_transient() {
        let error = GatewayError::non_ok("http://example.com", 503, "");
        assert_eq!(classify_poll_error(&error), PollFailure::Transient);
    }

    #[test]
    fn test_classify_malformed_permanent() {
        let error = GatewayError::malformed("http://example.com", "missing status");
        assert_eq!(classify_poll_error(&error), PollFailure::Permanent);
    }

    #[test]
    fn test_classify_invalid_url_permanent() {
        let error = GatewayError::invalid_url("::");
        assert_eq!(classify_poll_error(&error), PollFailure::Permanent);
    }
}
