//! Public API trait for the compute gateway.
//!
//! This trait is the seam between the gateway and its consumers: the gRPC
//! client implements it, and callers hold it as `Arc<dyn ComputeGatewayApi>`
//! so a fake can stand in for the backend in tests.

use async_trait::async_trait;

use crate::error::ComputeError;
use crate::models::{
    HealthSnapshot, MatrixMultiplyRequest, MatrixMultiplyResponse, MlInferenceRequest,
    MlInferenceResponse, MonteCarloRequest, MonteCarloResponse, StatisticsRequest,
    StatisticsResponse, VectorOperationRequest, VectorOperationResponse,
};

/// Public API trait for the compute gateway.
///
/// All compute operations share one behavior contract: requests are
/// validated locally before anything is sent, transient backend failures
/// are retried under a bounded backoff budget, and responses are decoded
/// into structured domain types.
#[async_trait]
pub trait ComputeGatewayApi: Send + Sync {
    /// Multiply two dense matrices on the backend.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if either matrix is empty or ragged, or the
    ///   inner dimensions disagree
    /// - `ConnectFailed`, `CallFailed`, `RetryExhausted` for transport
    ///   failures
    /// - `DecodeError` if the returned shape is inconsistent
    async fn multiply_matrices(
        &self,
        request: MatrixMultiplyRequest,
    ) -> Result<MatrixMultiplyResponse, ComputeError>;

    /// Compute statistical aggregates over a numeric sample.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the sample is empty
    /// - `ConnectFailed`, `CallFailed`, `RetryExhausted` for transport
    ///   failures
    async fn analyze_statistics(
        &self,
        request: StatisticsRequest,
    ) -> Result<StatisticsResponse, ComputeError>;

    /// Run a Monte Carlo simulation.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `iterations` or `dimensions` are out of range
    /// - `ConnectFailed`, `CallFailed`, `RetryExhausted` for transport
    ///   failures
    async fn run_monte_carlo(
        &self,
        request: MonteCarloRequest,
    ) -> Result<MonteCarloResponse, ComputeError>;

    /// Apply a vector operation to one or two vectors.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` on arity violations (`cross_product` needs two
    ///   3-vectors, `dot_product`/`distance` need equal lengths)
    /// - `ConnectFailed`, `CallFailed`, `RetryExhausted` for transport
    ///   failures
    /// - `DecodeError` if the backend answers a vector operation without
    ///   a vector
    async fn vector_operation(
        &self,
        request: VectorOperationRequest,
    ) -> Result<VectorOperationResponse, ComputeError>;

    /// Run ML inference on a named model.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the model name is empty or the shape does not
    ///   match the input length
    /// - `ModelNotFound` if the backend does not know the model
    /// - `ConnectFailed`, `CallFailed`, `RetryExhausted` for transport
    ///   failures
    /// - `DecodeError` if the top-k sequences disagree in length
    async fn run_inference(
        &self,
        request: MlInferenceRequest,
    ) -> Result<MlInferenceResponse, ComputeError>;

    /// Probe backend health.
    ///
    /// Infallible by contract: an unreachable backend yields an
    /// [`HealthSnapshot`] with `Unhealthy` status and the probe error
    /// recorded, never an `Err` or a panic.
    async fn check_health(&self) -> HealthSnapshot;

    /// Release the backend channel.
    ///
    /// Safe to call more than once; a later operation re-establishes the
    /// channel on demand. Teardown is a best-effort drain: in-flight
    /// calls are not guaranteed to complete first.
    async fn shutdown(&self);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{HealthStatus, VectorOperation, VectorResult};

    /// Minimal fake standing in for the real client.
    struct StubGateway;

    #[async_trait]
    impl ComputeGatewayApi for StubGateway {
        async fn multiply_matrices(
            &self,
            _request: MatrixMultiplyRequest,
        ) -> Result<MatrixMultiplyResponse, ComputeError> {
            Err(ComputeError::connect_failed("stub"))
        }

        async fn analyze_statistics(
            &self,
            _request: StatisticsRequest,
        ) -> Result<StatisticsResponse, ComputeError> {
            Err(ComputeError::connect_failed("stub"))
        }

        async fn run_monte_carlo(
            &self,
            _request: MonteCarloRequest,
        ) -> Result<MonteCarloResponse, ComputeError> {
            Err(ComputeError::connect_failed("stub"))
        }

        async fn vector_operation(
            &self,
            request: VectorOperationRequest,
        ) -> Result<VectorOperationResponse, ComputeError> {
            let result = if request.operation.yields_scalar() {
                VectorResult::Scalar(0.0)
            } else {
                VectorResult::Vector(vec![0.0; 3])
            };
            Ok(VectorOperationResponse {
                result,
                computation_time_ms: 0.0,
            })
        }

        async fn run_inference(
            &self,
            request: MlInferenceRequest,
        ) -> Result<MlInferenceResponse, ComputeError> {
            Err(ComputeError::model_not_found(request.model_name))
        }

        async fn check_health(&self) -> HealthSnapshot {
            HealthSnapshot::unhealthy("stub backend")
        }

        async fn shutdown(&self) {}
    }

    #[tokio::test]
    async fn a_fake_serves_callers_through_dynamic_dispatch() {
        let gateway: Arc<dyn ComputeGatewayApi> = Arc::new(StubGateway);

        let health = gateway.check_health().await;
        assert_eq!(health.status, HealthStatus::Unhealthy);

        let response = gateway
            .vector_operation(VectorOperationRequest {
                operation: VectorOperation::CrossProduct,
                vector_a: vec![1.0, 0.0, 0.0],
                vector_b: vec![0.0, 1.0, 0.0],
            })
            .await
            .unwrap();
        assert_eq!(response.result.as_vector(), Some(&[0.0, 0.0, 0.0][..]));

        gateway.shutdown().await;
    }
}
