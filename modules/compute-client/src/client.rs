//! The compute gateway client.
//!
//! [`ComputeGatewayClient`] implements [`ComputeGatewayApi`] by encoding
//! domain requests through [`crate::codec`], dispatching them over an
//! [`RpcTransport`], and retrying transient failures.
//!
//! ## Retry Policy
//!
//! Each operation runs under the configured [`RetryPolicy`]: transient
//! statuses (`Unavailable`, `DeadlineExceeded`) are re-attempted with
//! exponential backoff until the attempt budget is spent, every other
//! status propagates after exactly one attempt. Connection establishment
//! failures are never retried.
//!
//! ## Idempotency Warning
//!
//! **Retrying assumes the backend operations are idempotent.** All
//! current compute operations are pure functions of their request, so a
//! duplicate delivery is harmless. A future non-idempotent operation
//! must be configured with `max_attempts = 1`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;
use tonic::{Code, Status};

use compute_sdk::api::ComputeGatewayApi;
use compute_sdk::error::ComputeError;
use compute_sdk::models::{
    HealthSnapshot, MatrixMultiplyRequest, MatrixMultiplyResponse, MlInferenceRequest,
    MlInferenceResponse, MonteCarloRequest, MonteCarloResponse, StatisticsRequest,
    StatisticsResponse, VectorOperationRequest, VectorOperationResponse,
};
use compute_sdk::telemetry::{AttemptOutcome, CallObservation, CallObserver, NoopObserver};

use numgate_transport_grpc::{RetryDecision, RetryPolicy, RpcCall, RpcTransport, TransportError};

use crate::codec;
use crate::config::ComputeClientConfig;
use crate::connection::ConnectionManager;
use crate::health::HealthAggregator;
use crate::pb;

/// Stable snake_case name for a gRPC status code, used in error
/// variants and log fields.
fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "ok",
        Code::Cancelled => "cancelled",
        Code::Unknown => "unknown",
        Code::InvalidArgument => "invalid_argument",
        Code::DeadlineExceeded => "deadline_exceeded",
        Code::NotFound => "not_found",
        Code::AlreadyExists => "already_exists",
        Code::PermissionDenied => "permission_denied",
        Code::ResourceExhausted => "resource_exhausted",
        Code::FailedPrecondition => "failed_precondition",
        Code::Aborted => "aborted",
        Code::OutOfRange => "out_of_range",
        Code::Unimplemented => "unimplemented",
        Code::Internal => "internal",
        Code::Unavailable => "unavailable",
        Code::DataLoss => "data_loss",
        Code::Unauthenticated => "unauthenticated",
    }
}

fn status_to_error(status: &Status) -> ComputeError {
    ComputeError::call_failed(code_name(status.code()), status.message())
}

/// Client for the numerical compute backend.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self` and the
/// underlying channel multiplexes concurrent calls.
pub struct ComputeGatewayClient {
    transport: Arc<dyn RpcTransport>,
    retry: RetryPolicy,
    rpc_timeout: Duration,
    observer: Arc<dyn CallObserver>,
    health: HealthAggregator,
}

impl ComputeGatewayClient {
    /// Create a client that connects lazily to the configured endpoint.
    #[must_use]
    pub fn new(config: &ComputeClientConfig) -> Self {
        Self::with_transport(Arc::new(ConnectionManager::new(config)), config)
    }

    /// Create a client over an explicit transport. Production code uses
    /// [`ConnectionManager`]; tests substitute scripted fakes.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn RpcTransport>, config: &ComputeClientConfig) -> Self {
        Self {
            health: HealthAggregator::new(Arc::clone(&transport), config.health_timeout()),
            transport,
            retry: config.retry_policy(),
            rpc_timeout: config.rpc_timeout(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer that sees every call attempt, including the
    /// health probe's.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.health = self.health.with_observer(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    fn observe(
        &self,
        operation: &'static str,
        attempt: u32,
        outcome: AttemptOutcome,
        started: Instant,
        error: Option<String>,
    ) {
        self.observer.observe(&CallObservation {
            operation,
            attempt,
            outcome,
            latency: started.elapsed(),
            error,
        });
    }

    /// Run one logical operation: encoded payload in, raw reply out,
    /// retrying per the configured policy.
    async fn call_unary(
        &self,
        operation: &'static str,
        method: PathAndQuery,
        payload: Bytes,
    ) -> Result<Bytes, ComputeError> {
        let call = RpcCall::new(method, payload, self.rpc_timeout);
        let mut attempt: u32 = 1;
        loop {
            let started = Instant::now();
            match self.transport.invoke(&call).await {
                Ok(reply) => {
                    self.observe(operation, attempt, AttemptOutcome::Success, started, None);
                    tracing::debug!(operation, attempt, "compute call succeeded");
                    return Ok(reply);
                }
                Err(TransportError::Connect(err)) => {
                    self.observe(
                        operation,
                        attempt,
                        AttemptOutcome::PermanentFailure,
                        started,
                        Some(err.to_string()),
                    );
                    tracing::error!(
                        operation,
                        attempt,
                        error = %err,
                        "compute backend unreachable"
                    );
                    return Err(ComputeError::connect_failed(err.to_string()));
                }
                Err(TransportError::Call(status)) => {
                    match self.retry.decide(attempt, &status) {
                        RetryDecision::Retry { delay } => {
                            self.observe(
                                operation,
                                attempt,
                                AttemptOutcome::TransientFailure,
                                started,
                                Some(status.message().to_owned()),
                            );
                            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                            tracing::warn!(
                                operation,
                                attempt,
                                code = code_name(status.code()),
                                delay_ms,
                                "transient failure, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        RetryDecision::Exhausted => {
                            self.observe(
                                operation,
                                attempt,
                                AttemptOutcome::TransientFailure,
                                started,
                                Some(status.message().to_owned()),
                            );
                            tracing::error!(
                                operation,
                                attempts = attempt,
                                code = code_name(status.code()),
                                "retry budget exhausted"
                            );
                            return Err(ComputeError::retry_exhausted(
                                attempt,
                                status_to_error(&status),
                            ));
                        }
                        RetryDecision::GiveUp => {
                            self.observe(
                                operation,
                                attempt,
                                AttemptOutcome::PermanentFailure,
                                started,
                                Some(status.message().to_owned()),
                            );
                            tracing::error!(
                                operation,
                                attempt,
                                code = code_name(status.code()),
                                "compute call rejected"
                            );
                            return Err(status_to_error(&status));
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ComputeGatewayApi for ComputeGatewayClient {
    async fn multiply_matrices(
        &self,
        request: MatrixMultiplyRequest,
    ) -> Result<MatrixMultiplyResponse, ComputeError> {
        let payload = codec::encode_matrix_multiply(&request)?;
        let method = PathAndQuery::from_static(pb::MULTIPLY_MATRICES_PATH);
        let reply = self.call_unary("multiply_matrices", method, payload).await?;
        codec::decode_matrix_multiply(&reply)
    }

    async fn analyze_statistics(
        &self,
        request: StatisticsRequest,
    ) -> Result<StatisticsResponse, ComputeError> {
        let payload = codec::encode_statistics(&request)?;
        let method = PathAndQuery::from_static(pb::ANALYZE_STATISTICS_PATH);
        let reply = self.call_unary("analyze_statistics", method, payload).await?;
        codec::decode_statistics(&request, &reply)
    }

    async fn run_monte_carlo(
        &self,
        request: MonteCarloRequest,
    ) -> Result<MonteCarloResponse, ComputeError> {
        let payload = codec::encode_monte_carlo(&request)?;
        let method = PathAndQuery::from_static(pb::RUN_MONTE_CARLO_PATH);
        let reply = self.call_unary("run_monte_carlo", method, payload).await?;
        codec::decode_monte_carlo(&reply)
    }

    async fn vector_operation(
        &self,
        request: VectorOperationRequest,
    ) -> Result<VectorOperationResponse, ComputeError> {
        let payload = codec::encode_vector_operation(&request)?;
        let method = PathAndQuery::from_static(pb::VECTOR_OPERATION_PATH);
        let reply = self.call_unary("vector_operation", method, payload).await?;
        codec::decode_vector_operation(request.operation, &reply)
    }

    async fn run_inference(
        &self,
        request: MlInferenceRequest,
    ) -> Result<MlInferenceResponse, ComputeError> {
        let payload = codec::encode_inference(&request)?;
        let method = PathAndQuery::from_static(pb::ML_INFERENCE_PATH);
        let reply = match self.call_unary("run_inference", method, payload).await {
            Ok(reply) => reply,
            // NotFound from this method can only mean a model registry miss.
            Err(ComputeError::CallFailed { code, .. }) if code == "not_found" => {
                return Err(ComputeError::model_not_found(request.model_name));
            }
            Err(err) => return Err(err),
        };
        codec::decode_inference(&reply)
    }

    async fn check_health(&self) -> HealthSnapshot {
        self.health.check().await
    }

    async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}
