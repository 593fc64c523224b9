//! Protobuf messages for `compute.v1.ComputeService`.
//!
//! Hand-maintained mirror of `proto/compute/v1/compute.proto`, kept as
//! plain prost derives so building the crate needs no `protoc`. Field
//! tags and types must stay in sync with the proto file; the proto file
//! is the contract of record shared with the backend.
//!
//! Calls are dispatched dynamically by method path through the raw byte
//! codec in `numgate-transport-grpc`, so no service stubs exist here.

use std::collections::HashMap;

/// Full method path of `ComputeService.MultiplyMatrices`.
pub const MULTIPLY_MATRICES_PATH: &str = "/compute.v1.ComputeService/MultiplyMatrices";
/// Full method path of `ComputeService.AnalyzeStatistics`.
pub const ANALYZE_STATISTICS_PATH: &str = "/compute.v1.ComputeService/AnalyzeStatistics";
/// Full method path of `ComputeService.RunMonteCarlo`.
pub const RUN_MONTE_CARLO_PATH: &str = "/compute.v1.ComputeService/RunMonteCarlo";
/// Full method path of `ComputeService.VectorOperation`.
pub const VECTOR_OPERATION_PATH: &str = "/compute.v1.ComputeService/VectorOperation";
/// Full method path of `ComputeService.MLInference`.
pub const ML_INFERENCE_PATH: &str = "/compute.v1.ComputeService/MLInference";
/// Full method path of `ComputeService.HealthCheck`.
pub const HEALTH_CHECK_PATH: &str = "/compute.v1.ComputeService/HealthCheck";

#[derive(Clone, PartialEq, prost::Message)]
pub struct MatrixMultiplyRequest {
    /// Row-major values of the left operand (`rows_a` x `cols_a`).
    #[prost(double, repeated, tag = "1")]
    pub matrix_a: Vec<f64>,
    /// Row-major values of the right operand (`cols_a` x `cols_b`).
    #[prost(double, repeated, tag = "2")]
    pub matrix_b: Vec<f64>,
    #[prost(int32, tag = "3")]
    pub rows_a: i32,
    #[prost(int32, tag = "4")]
    pub cols_a: i32,
    #[prost(int32, tag = "5")]
    pub cols_b: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MatrixMultiplyResponse {
    /// Row-major values of the product (`rows` x `cols`).
    #[prost(double, repeated, tag = "1")]
    pub result: Vec<f64>,
    #[prost(int32, tag = "2")]
    pub rows: i32,
    #[prost(int32, tag = "3")]
    pub cols: i32,
    #[prost(double, tag = "4")]
    pub computation_time_ms: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StatsAnalysisRequest {
    #[prost(double, repeated, tag = "1")]
    pub data: Vec<f64>,
    /// Aggregate tags: `mean`, `median`, `stddev`, `variance`,
    /// `percentiles`.
    #[prost(string, repeated, tag = "2")]
    pub operations: Vec<String>,
}

/// Statistics payload. `min`, `max` and `count` are always set; the
/// requestable aggregates are left at zero when not computed (proto3
/// scalars carry no presence information).
#[derive(Clone, PartialEq, prost::Message)]
pub struct StatsAnalysisResponse {
    #[prost(double, tag = "1")]
    pub mean: f64,
    #[prost(double, tag = "2")]
    pub median: f64,
    #[prost(double, tag = "3")]
    pub stddev: f64,
    #[prost(double, tag = "4")]
    pub variance: f64,
    #[prost(double, tag = "5")]
    pub min: f64,
    #[prost(double, tag = "6")]
    pub max: f64,
    #[prost(int64, tag = "7")]
    pub count: i64,
    /// Percentile value by rank; ranks are fixed by the backend.
    #[prost(map = "int32, double", tag = "8")]
    pub percentiles: HashMap<i32, f64>,
    #[prost(double, tag = "9")]
    pub computation_time_ms: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MonteCarloRequest {
    #[prost(int64, tag = "1")]
    pub iterations: i64,
    #[prost(int32, tag = "2")]
    pub dimensions: i32,
    #[prost(int64, tag = "3")]
    pub seed: i64,
    /// Simulation tag: `pi_estimation`, `option_pricing`, `integration`.
    #[prost(string, tag = "4")]
    pub simulation_type: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MonteCarloResponse {
    #[prost(double, tag = "1")]
    pub result: f64,
    #[prost(double, tag = "2")]
    pub confidence_interval_lower: f64,
    #[prost(double, tag = "3")]
    pub confidence_interval_upper: f64,
    #[prost(int64, tag = "4")]
    pub iterations_completed: i64,
    /// Simulation-specific auxiliary metrics.
    #[prost(map = "string, double", tag = "5")]
    pub additional_metrics: HashMap<String, f64>,
    #[prost(double, tag = "6")]
    pub computation_time_ms: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct VectorOperationRequest {
    #[prost(double, repeated, tag = "1")]
    pub vector_a: Vec<f64>,
    #[prost(double, repeated, tag = "2")]
    pub vector_b: Vec<f64>,
    /// Operation tag: `dot_product`, `cross_product`, `norm`, `distance`.
    #[prost(string, tag = "3")]
    pub operation: String,
}

/// Exactly one of the two result fields is meaningful, selected by the
/// operation that was requested: `cross_product` fills `result_vector`,
/// everything else `result_scalar`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct VectorOperationResponse {
    #[prost(double, repeated, tag = "1")]
    pub result_vector: Vec<f64>,
    #[prost(double, tag = "2")]
    pub result_scalar: f64,
    #[prost(double, tag = "3")]
    pub computation_time_ms: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MlInferenceRequest {
    #[prost(string, tag = "1")]
    pub model_name: String,
    /// Flattened input tensor; element count must equal the product of
    /// `input_shape`.
    #[prost(float, repeated, tag = "2")]
    pub input_data: Vec<f32>,
    #[prost(int64, repeated, tag = "3")]
    pub input_shape: Vec<i64>,
    #[prost(bool, tag = "4")]
    pub apply_softmax: bool,
    #[prost(int32, tag = "5")]
    pub top_k: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MlInferenceResponse {
    #[prost(float, repeated, tag = "1")]
    pub output: Vec<f32>,
    /// Empty unless softmax was applied.
    #[prost(float, repeated, tag = "2")]
    pub probabilities: Vec<f32>,
    /// Parallel with `top_probabilities`, best class first; both empty
    /// when the model does not classify.
    #[prost(int64, repeated, tag = "3")]
    pub top_classes: Vec<i64>,
    #[prost(float, repeated, tag = "4")]
    pub top_probabilities: Vec<f32>,
    #[prost(double, tag = "5")]
    pub inference_time_ms: f64,
    #[prost(string, tag = "6")]
    pub model_info: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthCheckRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthCheckResponse {
    /// `healthy` for a fully operational backend; anything else is
    /// surfaced as degraded.
    #[prost(string, tag = "1")]
    pub status: String,
    #[prost(double, tag = "2")]
    pub uptime_seconds: f64,
    #[prost(uint64, tag = "3")]
    pub total_requests: u64,
    #[prost(double, tag = "4")]
    pub avg_response_time_ms: f64,
}
