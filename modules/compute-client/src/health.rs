//! Backend health aggregation.
//!
//! The probe is deliberately single-attempt with its own short deadline:
//! a health endpoint that needs a retry budget to answer is not healthy.
//! [`HealthAggregator::check`] never fails; every transport, decode, or
//! status problem is folded into an [`HealthStatus::Unhealthy`] snapshot
//! carrying the error text.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::uri::PathAndQuery;

use compute_sdk::models::{HealthSnapshot, HealthStatus};
use compute_sdk::telemetry::{AttemptOutcome, CallObservation, CallObserver, NoopObserver};

use numgate_transport_grpc::{RpcCall, RpcTransport};

use crate::codec;
use crate::pb;

/// Translates the backend's health report into a [`HealthSnapshot`].
///
/// The backend reports `"healthy"` when fully operational; any other
/// non-error report (for example a warm-up phase) maps to
/// [`HealthStatus::Degraded`]. The average response time is surfaced
/// only once the backend has served at least one request; an idle
/// backend leaves that field unset on the wire.
fn snapshot_from(msg: pb::HealthCheckResponse) -> HealthSnapshot {
    let status = if msg.status == "healthy" {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };
    // The backend fills in the average only after it has served a
    // request; before that the wire field is an unset proto3 zero.
    let avg_response_time_ms = (msg.total_requests > 0).then_some(msg.avg_response_time_ms);
    HealthSnapshot {
        status,
        uptime_seconds: Some(msg.uptime_seconds),
        total_requests: Some(msg.total_requests),
        avg_response_time_ms,
        error: None,
    }
}

/// Single-attempt health probe over the shared transport.
pub struct HealthAggregator {
    transport: Arc<dyn RpcTransport>,
    timeout: Duration,
    observer: Arc<dyn CallObserver>,
}

impl HealthAggregator {
    /// Create a probe with the given per-check deadline.
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer that sees each probe attempt.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn observe(&self, outcome: AttemptOutcome, started: Instant, error: Option<String>) {
        self.observer.observe(&CallObservation {
            operation: "check_health",
            attempt: 1,
            outcome,
            latency: started.elapsed(),
            error,
        });
    }

    /// Probe the backend once.
    pub async fn check(&self) -> HealthSnapshot {
        let call = RpcCall::new(
            PathAndQuery::from_static(pb::HEALTH_CHECK_PATH),
            codec::encode_health_check(),
            self.timeout,
        );
        let started = Instant::now();
        match self.transport.invoke(&call).await {
            Ok(reply) => match codec::decode_health_check(&reply) {
                Ok(msg) => {
                    self.observe(AttemptOutcome::Success, started, None);
                    snapshot_from(msg)
                }
                Err(err) => {
                    self.observe(
                        AttemptOutcome::PermanentFailure,
                        started,
                        Some(err.to_string()),
                    );
                    tracing::warn!(error = %err, "health probe returned an undecodable reply");
                    HealthSnapshot::unhealthy(err.to_string())
                }
            },
            Err(err) => {
                let outcome = if err.is_transient() {
                    AttemptOutcome::TransientFailure
                } else {
                    AttemptOutcome::PermanentFailure
                };
                self.observe(outcome, started, Some(err.to_string()));
                tracing::warn!(error = %err, "health probe failed");
                HealthSnapshot::unhealthy(err.to_string())
            }
        }
    }
}
