//! Telemetry hook for per-attempt call observations.
//!
//! The gateway emits one [`CallObservation`] per RPC attempt and per
//! health probe. Metric and log sinks live outside this crate; they
//! subscribe by implementing [`CallObserver`].

use std::time::Duration;

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptOutcome {
    /// The attempt succeeded.
    Success,
    /// The attempt failed with a transient status; a retry may follow.
    TransientFailure,
    /// The attempt failed with a non-retryable error.
    PermanentFailure,
}

impl AttemptOutcome {
    /// Stable string tag for structured logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::TransientFailure => "transient_failure",
            Self::PermanentFailure => "permanent_failure",
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observation: a single RPC attempt or health probe.
#[derive(Debug, Clone)]
pub struct CallObservation {
    /// Logical operation name (`multiply_matrices`, `check_health`, ...).
    pub operation: &'static str,
    /// 1-based attempt number within the logical call.
    pub attempt: u32,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Wall-clock duration of this attempt.
    pub latency: Duration,
    /// Failure description when the attempt did not succeed.
    pub error: Option<String>,
}

/// Sink for call observations.
///
/// Implementations must be cheap and non-blocking: the client invokes
/// this inline on the request path after every attempt.
pub trait CallObserver: Send + Sync {
    /// Record one observation.
    fn observe(&self, observation: &CallObservation);
}

/// Observer that drops every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {
    fn observe(&self, _observation: &CallObservation) {}
}
