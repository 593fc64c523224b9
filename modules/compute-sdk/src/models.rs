//! Domain models for the compute gateway.
//!
//! These are the transport-agnostic request/response types consumed by
//! other modules and serialized by the presentation layer. Structural
//! validation (matrix shape, vector arity) happens in the client crate at
//! encode time; these types only carry the data and its defaults.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::ComputeError;

/// Request to multiply two dense matrices on the backend.
///
/// Matrices are row-major, `matrix_a` is `m x n`, `matrix_b` is `n x p`.
/// Shape rules (non-empty, rectangular, inner dimensions equal) are
/// enforced when the request is encoded, before anything is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMultiplyRequest {
    /// Left operand, rows of equal length.
    pub matrix_a: Vec<Vec<f64>>,
    /// Right operand, rows of equal length.
    pub matrix_b: Vec<Vec<f64>>,
}

/// Result of a matrix multiplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMultiplyResponse {
    /// Product matrix, reshaped into `rows` rows of `cols` values each.
    pub result: Vec<Vec<f64>>,
    /// Number of rows in `result`.
    pub rows: usize,
    /// Number of columns in `result`.
    pub cols: usize,
    /// Backend-reported computation time in milliseconds.
    pub computation_time_ms: f64,
}

/// Statistical aggregate the backend can compute.
///
/// The set is closed: unknown tags are rejected at the parse boundary,
/// so an unsupported operation can never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsOperation {
    /// Arithmetic mean.
    Mean,
    /// Middle value of the sorted sample.
    Median,
    /// Sample standard deviation.
    Stddev,
    /// Sample variance.
    Variance,
    /// Percentile table at backend-fixed ranks (25/50/75/95/99).
    Percentiles,
}

impl StatsOperation {
    /// Stable string tag, as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Stddev => "stddev",
            Self::Variance => "variance",
            Self::Percentiles => "percentiles",
        }
    }
}

impl std::fmt::Display for StatsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatsOperation {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "stddev" => Ok(Self::Stddev),
            "variance" => Ok(Self::Variance),
            "percentiles" => Ok(Self::Percentiles),
            other => Err(ComputeError::invalid_request(
                "operations",
                format!("unknown statistics operation: {other}"),
            )),
        }
    }
}

fn default_operations() -> BTreeSet<StatsOperation> {
    BTreeSet::from([
        StatsOperation::Mean,
        StatsOperation::Stddev,
        StatsOperation::Percentiles,
    ])
}

/// Request for statistical analysis of a numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRequest {
    /// Sample values; must be non-empty.
    pub data: Vec<f64>,
    /// Aggregates to compute. Deduplicated by construction.
    #[serde(default = "default_operations")]
    pub operations: BTreeSet<StatsOperation>,
}

impl StatisticsRequest {
    /// Creates a request with the default operation set
    /// (`mean`, `stddev`, `percentiles`).
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            operations: default_operations(),
        }
    }
}

/// Statistical aggregates returned by the backend.
///
/// `mean`, `min`, `max` and `count` are always present. The remaining
/// aggregates are present only when they were requested and the backend
/// reported a non-zero value; a genuinely zero median is therefore
/// indistinguishable from an absent one (wire-format limitation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    /// Arithmetic mean of the sample.
    pub mean: f64,
    /// Median, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Sample standard deviation, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    /// Sample variance, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    /// Smallest sample value.
    pub min: f64,
    /// Largest sample value.
    pub max: f64,
    /// Sample size.
    pub count: u64,
    /// Percentile table keyed by rank, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<BTreeMap<u32, f64>>,
    /// Backend-reported computation time in milliseconds.
    pub computation_time_ms: f64,
}

/// Monte Carlo simulation family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    /// Estimate pi by sampling the unit square.
    #[default]
    PiEstimation,
    /// Price a European option by simulated paths.
    OptionPricing,
    /// Numerically integrate over the unit hypercube.
    Integration,
}

impl SimulationKind {
    /// Stable string tag, as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PiEstimation => "pi_estimation",
            Self::OptionPricing => "option_pricing",
            Self::Integration => "integration",
        }
    }
}

impl std::fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SimulationKind {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pi_estimation" => Ok(Self::PiEstimation),
            "option_pricing" => Ok(Self::OptionPricing),
            "integration" => Ok(Self::Integration),
            other => Err(ComputeError::invalid_request(
                "simulation_type",
                format!("unknown simulation type: {other}"),
            )),
        }
    }
}

fn default_dimensions() -> u32 {
    2
}

fn default_seed() -> i64 {
    42
}

/// Request to run a Monte Carlo simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloRequest {
    /// Which simulation to run.
    #[serde(default)]
    pub simulation: SimulationKind,
    /// Number of samples, in `1..=10_000_000`.
    pub iterations: u64,
    /// Problem dimensionality, in `1..=10`.
    #[serde(default = "default_dimensions")]
    pub dimensions: u32,
    /// RNG seed; fixed seeds make runs reproducible.
    #[serde(default = "default_seed")]
    pub seed: i64,
}

impl MonteCarloRequest {
    /// Creates a request with the default dimensionality (2) and seed (42).
    #[must_use]
    pub fn new(simulation: SimulationKind, iterations: u64) -> Self {
        Self {
            simulation,
            iterations,
            dimensions: default_dimensions(),
            seed: default_seed(),
        }
    }
}

/// Result of a Monte Carlo simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResponse {
    /// Point estimate produced by the simulation.
    pub result: f64,
    /// Lower bound of the confidence interval.
    pub confidence_interval_lower: f64,
    /// Upper bound of the confidence interval.
    pub confidence_interval_upper: f64,
    /// Samples actually evaluated; may be fewer than requested.
    pub iterations_completed: u64,
    /// Simulation-specific auxiliary metrics.
    #[serde(default)]
    pub additional_metrics: BTreeMap<String, f64>,
    /// Backend-reported computation time in milliseconds.
    pub computation_time_ms: f64,
}

/// Vector operation the backend can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOperation {
    /// Inner product of two equal-length vectors.
    DotProduct,
    /// Cross product of two 3-vectors.
    CrossProduct,
    /// Euclidean norm of `vector_a`.
    Norm,
    /// Euclidean distance between two equal-length vectors.
    Distance,
}

impl VectorOperation {
    /// Stable string tag, as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DotProduct => "dot_product",
            Self::CrossProduct => "cross_product",
            Self::Norm => "norm",
            Self::Distance => "distance",
        }
    }

    /// `true` when the operation yields a scalar rather than a vector.
    #[must_use]
    pub fn yields_scalar(self) -> bool {
        !matches!(self, Self::CrossProduct)
    }
}

impl std::fmt::Display for VectorOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VectorOperation {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot_product" => Ok(Self::DotProduct),
            "cross_product" => Ok(Self::CrossProduct),
            "norm" => Ok(Self::Norm),
            "distance" => Ok(Self::Distance),
            other => Err(ComputeError::invalid_request(
                "operation",
                format!("unknown vector operation: {other}"),
            )),
        }
    }
}

/// Request to apply a [`VectorOperation`] to one or two vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorOperationRequest {
    /// Operation to perform.
    pub operation: VectorOperation,
    /// First operand; must be non-empty.
    pub vector_a: Vec<f64>,
    /// Second operand. Ignored by `norm`; arity rules for the other
    /// operations are enforced at encode time.
    #[serde(default)]
    pub vector_b: Vec<f64>,
}

/// Result payload of a vector operation: exactly one of the two shapes,
/// selected by the operation that was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorResult {
    /// Scalar result (`dot_product`, `norm`, `distance`).
    Scalar(f64),
    /// Vector result (`cross_product`).
    Vector(Vec<f64>),
}

impl VectorResult {
    /// Returns the scalar value, if this is a scalar result.
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// Returns the vector value, if this is a vector result.
    #[must_use]
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Vector(v) => Some(v),
        }
    }
}

/// Result of a vector operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorOperationResponse {
    /// Scalar or vector result, per the requested operation.
    pub result: VectorResult,
    /// Backend-reported computation time in milliseconds.
    pub computation_time_ms: f64,
}

fn default_apply_softmax() -> bool {
    true
}

fn default_top_k() -> u32 {
    5
}

/// Request to run ML inference on a named model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlInferenceRequest {
    /// Model identifier known to the backend.
    pub model_name: String,
    /// Flattened input tensor.
    pub input_data: Vec<f32>,
    /// Tensor shape; its element product must equal `input_data.len()`.
    pub input_shape: Vec<i64>,
    /// Whether the backend should softmax the raw output.
    #[serde(default = "default_apply_softmax")]
    pub apply_softmax: bool,
    /// How many top classes to return, at least 1.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl MlInferenceRequest {
    /// Creates a request with the default post-processing
    /// (`apply_softmax = true`, `top_k = 5`).
    #[must_use]
    pub fn new(model_name: impl Into<String>, input_data: Vec<f32>, input_shape: Vec<i64>) -> Self {
        Self {
            model_name: model_name.into(),
            input_data,
            input_shape,
            apply_softmax: default_apply_softmax(),
            top_k: default_top_k(),
        }
    }
}

/// Top-k classification result.
///
/// `classes` and `probabilities` are parallel sequences of equal length;
/// the decoder rejects responses where they disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPredictions {
    /// Class indices, best first.
    pub classes: Vec<i64>,
    /// Probability (or score) per class, same order.
    pub probabilities: Vec<f32>,
}

/// Result of an ML inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlInferenceResponse {
    /// Raw model output, flattened.
    pub output: Vec<f32>,
    /// Softmaxed output, when the backend produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f32>>,
    /// Top-k classes with probabilities, when the backend produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_predictions: Option<TopPredictions>,
    /// Backend-reported inference time in milliseconds.
    pub inference_time_ms: f64,
    /// Free-form model description from the backend.
    pub model_info: String,
}

/// Overall backend health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Backend reachable and self-reporting healthy.
    Healthy,
    /// Backend reachable but self-reporting a non-healthy status.
    Degraded,
    /// Backend unreachable or the probe failed.
    Unhealthy,
}

impl HealthStatus {
    /// Stable string tag for logs and payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time backend health, produced fresh on every probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Health classification.
    pub status: HealthStatus,
    /// Backend uptime, when the probe succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<f64>,
    /// Requests served by the backend, when the probe succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    /// Backend-side mean response time, when the probe succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time_ms: Option<f64>,
    /// Probe failure description, when the probe failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthSnapshot {
    /// Snapshot for an unreachable or failing backend.
    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            uptime_seconds: None,
            total_requests: None,
            avg_response_time_ms: None,
            error: Some(error.into()),
        }
    }
}
