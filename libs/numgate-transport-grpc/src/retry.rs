//! Retry decision logic for unary gRPC calls.
//!
//! The policy is a pure function from (attempt number, status) to a
//! [`RetryDecision`]; callers own the loop and the sleep, which keeps the
//! decision testable without real timing.
//!
//! ## Retry Policy
//!
//! Only transient, network-related errors are retryable:
//! - [`tonic::Code::Unavailable`] - server temporarily unavailable
//! - [`tonic::Code::DeadlineExceeded`] - attempt timed out
//!
//! All other codes mean the backend explicitly rejected the request and
//! propagate immediately, regardless of how much budget is left.
//!
//! ## Idempotency Warning
//!
//! **Retrying assumes the operation is idempotent.** Non-idempotent
//! operations should be called with `max_attempts = 1`.

use std::time::Duration;

use tonic::{Code, Status};

/// Whether a gRPC status code belongs to the transient, retryable class.
#[must_use]
pub fn is_transient(code: Code) -> bool {
    matches!(code, Code::Unavailable | Code::DeadlineExceeded)
}

/// Retry policy parameters for unary calls.
///
/// Defaults: 3 total attempts, backoff 1s doubling per attempt, capped
/// at 10s — so consecutive failures wait 1s, 2s, 4s, ...
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct RetryPolicy {
    /// Total attempts per logical operation, first call included.
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles per attempt after that.
    pub base_delay: Duration,

    /// Upper bound on the backoff duration.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Outcome of consulting the [`RetryPolicy`] after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait the given delay, then re-attempt.
    Retry {
        /// How long to sleep before the next attempt.
        delay: Duration,
    },
    /// Transient failure, but the attempt budget is spent.
    Exhausted,
    /// Non-retryable failure; propagate it unchanged.
    GiveUp,
}

impl RetryPolicy {
    /// Create a policy with the given total attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Set the base backoff delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum backoff delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Backoff delay after attempt number `attempt` (1-based) failed:
    /// `base_delay * 2^(attempt - 1)`, never above `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed
    /// with `status`.
    #[must_use]
    pub fn decide(&self, attempt: u32, status: &Status) -> RetryDecision {
        if !is_transient(status.code()) {
            return RetryDecision::GiveUp;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry {
            delay: self.delay_for_attempt(attempt),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(Code::Unavailable));
        assert!(is_transient(Code::DeadlineExceeded));

        assert!(!is_transient(Code::InvalidArgument));
        assert!(!is_transient(Code::NotFound));
        assert!(!is_transient(Code::Internal));
        assert!(!is_transient(Code::PermissionDenied));
    }

    #[test]
    fn test_backoff_sequence_doubles_and_caps() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
        // Capped at max_delay
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(32), Duration::from_secs(10));
    }

    #[test]
    fn test_policy_builder() {
        let policy = RetryPolicy::new(5)
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5));

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_decide_retries_transient_within_budget() {
        let policy = RetryPolicy::default();
        let status = Status::unavailable("backend down");

        assert_eq!(
            policy.decide(1, &status),
            RetryDecision::Retry {
                delay: Duration::from_secs(1)
            }
        );
        assert_eq!(
            policy.decide(2, &status),
            RetryDecision::Retry {
                delay: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn test_decide_exhausted_at_budget() {
        let policy = RetryPolicy::default();
        let status = Status::deadline_exceeded("attempt timed out");

        assert_eq!(policy.decide(3, &status), RetryDecision::Exhausted);
        assert_eq!(policy.decide(7, &status), RetryDecision::Exhausted);
    }

    #[test]
    fn test_decide_gives_up_on_non_retryable() {
        let policy = RetryPolicy::default();

        let rejected = Status::invalid_argument("malformed payload");
        assert_eq!(policy.decide(1, &rejected), RetryDecision::GiveUp);

        let missing = Status::not_found("no such model");
        assert_eq!(policy.decide(1, &missing), RetryDecision::GiveUp);
    }

    #[test]
    fn test_zero_attempt_budget_never_retries() {
        let policy = RetryPolicy::new(1);
        let status = Status::unavailable("backend down");

        assert_eq!(policy.decide(1, &status), RetryDecision::Exhausted);
    }
}
