//! Compute Gateway SDK
//!
//! This crate provides the public contract for the compute gateway module:
//!
//! - [`ComputeGatewayApi`] - API trait implemented by the gRPC client
//! - Domain models ([`MatrixMultiplyRequest`], [`StatisticsRequest`],
//!   [`MonteCarloRequest`], [`VectorOperationRequest`],
//!   [`MlInferenceRequest`] and their responses)
//! - [`ComputeError`] - Error taxonomy shared across the call path
//! - [`CallObserver`] / [`CallObservation`] - Per-attempt telemetry hook
//!
//! The crate is transport-agnostic: no gRPC types appear in any signature,
//! so consumers and tests can implement [`ComputeGatewayApi`] without
//! touching tonic.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod telemetry;

// Re-export main types at crate root
pub use api::ComputeGatewayApi;
pub use error::ComputeError;
pub use models::{
    HealthSnapshot, HealthStatus, MatrixMultiplyRequest, MatrixMultiplyResponse,
    MlInferenceRequest, MlInferenceResponse, MonteCarloRequest, MonteCarloResponse,
    SimulationKind, StatisticsRequest, StatisticsResponse, StatsOperation, TopPredictions,
    VectorOperation, VectorOperationRequest, VectorOperationResponse, VectorResult,
};
pub use telemetry::{AttemptOutcome, CallObservation, CallObserver, NoopObserver};
