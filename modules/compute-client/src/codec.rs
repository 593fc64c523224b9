//! Translation between domain types and the flat wire messages.
//!
//! Every function here is pure: encoding validates the request and
//! flattens it into protobuf bytes, decoding reconstructs structured
//! responses and applies the presence rules of the backend's proto3
//! contract. Anything that fails validation is rejected as
//! [`ComputeError::InvalidRequest`] before a single byte leaves the
//! process; inconsistent responses surface as
//! [`ComputeError::DecodeError`].

use std::collections::BTreeMap;

use bytes::Bytes;
use prost::Message;

use compute_sdk::error::ComputeError;
use compute_sdk::models::{
    MatrixMultiplyRequest, MatrixMultiplyResponse, MlInferenceRequest, MlInferenceResponse,
    MonteCarloRequest, MonteCarloResponse, StatisticsRequest, StatisticsResponse, StatsOperation,
    TopPredictions, VectorOperation, VectorOperationRequest, VectorOperationResponse, VectorResult,
};

use crate::pb;

/// Upper bound on Monte Carlo iterations per request.
pub const MAX_MONTE_CARLO_ITERATIONS: u64 = 10_000_000;

/// Upper bound on Monte Carlo problem dimensionality.
pub const MAX_MONTE_CARLO_DIMENSIONS: u32 = 10;

fn decode_failure(err: prost::DecodeError) -> ComputeError {
    ComputeError::decode_error(err.to_string())
}

fn encoded(msg: &impl Message) -> Bytes {
    Bytes::from(msg.encode_to_vec())
}

/// Validates that a matrix is non-empty and rectangular, returning its
/// dimensions.
fn matrix_dims(field: &str, matrix: &[Vec<f64>]) -> Result<(usize, usize), ComputeError> {
    let rows = matrix.len();
    if rows == 0 {
        return Err(ComputeError::invalid_request(field, "must not be empty"));
    }
    let cols = matrix.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(ComputeError::invalid_request(
            field,
            "rows must not be empty",
        ));
    }
    if matrix.iter().any(|row| row.len() != cols) {
        return Err(ComputeError::invalid_request(
            field,
            "rows must all have the same length",
        ));
    }
    Ok((rows, cols))
}

fn dim_to_wire(field: &str, dim: usize) -> Result<i32, ComputeError> {
    i32::try_from(dim)
        .map_err(|_| ComputeError::invalid_request(field, "dimension exceeds the wire limit"))
}

fn flatten(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix.iter().flatten().copied().collect()
}

/// Encodes a matrix multiplication request, flattening both operands
/// row-major.
///
/// # Errors
///
/// `InvalidRequest` if either matrix is empty or ragged, or if the inner
/// dimensions disagree.
pub fn encode_matrix_multiply(req: &MatrixMultiplyRequest) -> Result<Bytes, ComputeError> {
    let (rows_a, cols_a) = matrix_dims("matrix_a", &req.matrix_a)?;
    let (rows_b, cols_b) = matrix_dims("matrix_b", &req.matrix_b)?;
    if cols_a != rows_b {
        return Err(ComputeError::invalid_request(
            "matrix_b",
            format!(
                "cannot multiply {rows_a}x{cols_a} by {rows_b}x{cols_b}: inner dimensions disagree"
            ),
        ));
    }

    let msg = pb::MatrixMultiplyRequest {
        matrix_a: flatten(&req.matrix_a),
        matrix_b: flatten(&req.matrix_b),
        rows_a: dim_to_wire("matrix_a", rows_a)?,
        cols_a: dim_to_wire("matrix_a", cols_a)?,
        cols_b: dim_to_wire("matrix_b", cols_b)?,
    };
    Ok(encoded(&msg))
}

fn dim_from_wire(field: &str, dim: i32) -> Result<usize, ComputeError> {
    if dim < 1 {
        return Err(ComputeError::decode_error(format!(
            "{field} must be positive, got {dim}"
        )));
    }
    usize::try_from(dim)
        .map_err(|_| ComputeError::decode_error(format!("{field} out of range: {dim}")))
}

/// Decodes a matrix multiplication response, reshaping the flat result
/// into `rows` rows of `cols` values.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed, a dimension is
/// non-positive, or `rows * cols` does not match the value count.
pub fn decode_matrix_multiply(bytes: &[u8]) -> Result<MatrixMultiplyResponse, ComputeError> {
    let msg = pb::MatrixMultiplyResponse::decode(bytes).map_err(decode_failure)?;
    let rows = dim_from_wire("rows", msg.rows)?;
    let cols = dim_from_wire("cols", msg.cols)?;
    if rows.checked_mul(cols) != Some(msg.result.len()) {
        return Err(ComputeError::decode_error(format!(
            "result holds {} values, which does not fill {rows}x{cols}",
            msg.result.len()
        )));
    }
    let result = msg.result.chunks(cols).map(<[f64]>::to_vec).collect();
    Ok(MatrixMultiplyResponse {
        result,
        rows,
        cols,
        computation_time_ms: msg.computation_time_ms,
    })
}

/// Encodes a statistics request; operations travel as their string tags.
///
/// # Errors
///
/// `InvalidRequest` if the sample is empty.
pub fn encode_statistics(req: &StatisticsRequest) -> Result<Bytes, ComputeError> {
    if req.data.is_empty() {
        return Err(ComputeError::invalid_request("data", "must not be empty"));
    }
    let msg = pb::StatsAnalysisRequest {
        data: req.data.clone(),
        operations: req
            .operations
            .iter()
            .map(|op| op.as_str().to_owned())
            .collect(),
    };
    Ok(encoded(&msg))
}

// proto3 scalars have no presence bit, so a requested aggregate coming
// back as exactly 0.0 is indistinguishable from one the backend skipped.
// It is reported absent, matching what the backend's other consumers do.
fn gate(requested: bool, value: f64) -> Option<f64> {
    (requested && value != 0.0).then_some(value)
}

/// Decodes a statistics response against the request that produced it.
///
/// `mean`, `min`, `max` and `count` are always taken from the wire; the
/// optional aggregates are populated only when they were requested and
/// the backend reported a non-zero value.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed, the sample count is
/// negative, or a percentile rank is negative.
pub fn decode_statistics(
    req: &StatisticsRequest,
    bytes: &[u8],
) -> Result<StatisticsResponse, ComputeError> {
    let msg = pb::StatsAnalysisResponse::decode(bytes).map_err(decode_failure)?;

    let percentiles = if req.operations.contains(&StatsOperation::Percentiles)
        && !msg.percentiles.is_empty()
    {
        let mut table = BTreeMap::new();
        for (&rank, &value) in &msg.percentiles {
            let rank = u32::try_from(rank).map_err(|_| {
                ComputeError::decode_error(format!("negative percentile rank: {rank}"))
            })?;
            table.insert(rank, value);
        }
        Some(table)
    } else {
        None
    };

    let count = u64::try_from(msg.count)
        .map_err(|_| ComputeError::decode_error(format!("negative sample count: {}", msg.count)))?;

    Ok(StatisticsResponse {
        mean: msg.mean,
        median: gate(req.operations.contains(&StatsOperation::Median), msg.median),
        stddev: gate(req.operations.contains(&StatsOperation::Stddev), msg.stddev),
        variance: gate(
            req.operations.contains(&StatsOperation::Variance),
            msg.variance,
        ),
        min: msg.min,
        max: msg.max,
        count,
        percentiles,
        computation_time_ms: msg.computation_time_ms,
    })
}

/// Encodes a Monte Carlo request.
///
/// # Errors
///
/// `InvalidRequest` if `iterations` is outside `1..=10_000_000` or
/// `dimensions` outside `1..=10`.
pub fn encode_monte_carlo(req: &MonteCarloRequest) -> Result<Bytes, ComputeError> {
    if !(1..=MAX_MONTE_CARLO_ITERATIONS).contains(&req.iterations) {
        return Err(ComputeError::invalid_request(
            "iterations",
            format!("must be in 1..={MAX_MONTE_CARLO_ITERATIONS}"),
        ));
    }
    if !(1..=MAX_MONTE_CARLO_DIMENSIONS).contains(&req.dimensions) {
        return Err(ComputeError::invalid_request(
            "dimensions",
            format!("must be in 1..={MAX_MONTE_CARLO_DIMENSIONS}"),
        ));
    }
    let msg = pb::MonteCarloRequest {
        iterations: i64::try_from(req.iterations).unwrap_or(i64::MAX),
        dimensions: i32::try_from(req.dimensions).unwrap_or(i32::MAX),
        seed: req.seed,
        simulation_type: req.simulation.as_str().to_owned(),
    };
    Ok(encoded(&msg))
}

/// Decodes a Monte Carlo response.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed or the completed iteration
/// count is negative.
pub fn decode_monte_carlo(bytes: &[u8]) -> Result<MonteCarloResponse, ComputeError> {
    let msg = pb::MonteCarloResponse::decode(bytes).map_err(decode_failure)?;
    let iterations_completed = u64::try_from(msg.iterations_completed).map_err(|_| {
        ComputeError::decode_error(format!(
            "negative iterations_completed: {}",
            msg.iterations_completed
        ))
    })?;
    Ok(MonteCarloResponse {
        result: msg.result,
        confidence_interval_lower: msg.confidence_interval_lower,
        confidence_interval_upper: msg.confidence_interval_upper,
        iterations_completed,
        additional_metrics: msg.additional_metrics.into_iter().collect(),
        computation_time_ms: msg.computation_time_ms,
    })
}

/// Encodes a vector operation request after checking arity.
///
/// # Errors
///
/// `InvalidRequest` if `vector_a` is empty, if `cross_product` operands
/// are not both 3-vectors, or if `dot_product`/`distance` operands differ
/// in length. `norm` ignores `vector_b` entirely.
pub fn encode_vector_operation(req: &VectorOperationRequest) -> Result<Bytes, ComputeError> {
    if req.vector_a.is_empty() {
        return Err(ComputeError::invalid_request(
            "vector_a",
            "must not be empty",
        ));
    }
    match req.operation {
        VectorOperation::CrossProduct => {
            if req.vector_a.len() != 3 {
                return Err(ComputeError::invalid_request(
                    "vector_a",
                    format!(
                        "cross_product requires 3-vectors, got length {}",
                        req.vector_a.len()
                    ),
                ));
            }
            if req.vector_b.len() != 3 {
                return Err(ComputeError::invalid_request(
                    "vector_b",
                    format!(
                        "cross_product requires 3-vectors, got length {}",
                        req.vector_b.len()
                    ),
                ));
            }
        }
        VectorOperation::DotProduct | VectorOperation::Distance => {
            if req.vector_b.len() != req.vector_a.len() {
                return Err(ComputeError::invalid_request(
                    "vector_b",
                    format!(
                        "{} requires equal-length vectors, got {} and {}",
                        req.operation,
                        req.vector_a.len(),
                        req.vector_b.len()
                    ),
                ));
            }
        }
        VectorOperation::Norm => {}
    }
    let msg = pb::VectorOperationRequest {
        vector_a: req.vector_a.clone(),
        vector_b: req.vector_b.clone(),
        operation: req.operation.as_str().to_owned(),
    };
    Ok(encoded(&msg))
}

/// Decodes a vector operation response into a [`VectorResult`].
///
/// The requested operation selects the field: scalar operations read
/// `result_scalar` (where 0.0 is a legitimate value, e.g. orthogonal
/// vectors), `cross_product` reads `result_vector`.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed, or a vector-valued
/// operation came back without a vector.
pub fn decode_vector_operation(
    operation: VectorOperation,
    bytes: &[u8],
) -> Result<VectorOperationResponse, ComputeError> {
    let msg = pb::VectorOperationResponse::decode(bytes).map_err(decode_failure)?;
    let result = if operation.yields_scalar() {
        VectorResult::Scalar(msg.result_scalar)
    } else if msg.result_vector.is_empty() {
        return Err(ComputeError::decode_error(format!(
            "{operation} expects a vector result but none was returned"
        )));
    } else {
        VectorResult::Vector(msg.result_vector)
    };
    Ok(VectorOperationResponse {
        result,
        computation_time_ms: msg.computation_time_ms,
    })
}

/// Encodes an inference request.
///
/// # Errors
///
/// `InvalidRequest` if the model name or input is empty, a shape
/// dimension is non-positive, the shape's element product does not match
/// the input length, or `top_k` is zero.
pub fn encode_inference(req: &MlInferenceRequest) -> Result<Bytes, ComputeError> {
    if req.model_name.is_empty() {
        return Err(ComputeError::invalid_request(
            "model_name",
            "must not be empty",
        ));
    }
    if req.input_data.is_empty() {
        return Err(ComputeError::invalid_request(
            "input_data",
            "must not be empty",
        ));
    }
    if req.input_shape.is_empty() {
        return Err(ComputeError::invalid_request(
            "input_shape",
            "must not be empty",
        ));
    }
    if req.input_shape.iter().any(|&dim| dim < 1) {
        return Err(ComputeError::invalid_request(
            "input_shape",
            "dimensions must be positive",
        ));
    }
    let shape_elements = req
        .input_shape
        .iter()
        .try_fold(1usize, |acc, &dim| {
            usize::try_from(dim).ok().and_then(|dim| acc.checked_mul(dim))
        });
    if shape_elements != Some(req.input_data.len()) {
        return Err(ComputeError::invalid_request(
            "input_shape",
            format!(
                "shape does not match input length {}",
                req.input_data.len()
            ),
        ));
    }
    if req.top_k < 1 {
        return Err(ComputeError::invalid_request(
            "top_k",
            "must be at least 1",
        ));
    }
    let msg = pb::MlInferenceRequest {
        model_name: req.model_name.clone(),
        input_data: req.input_data.clone(),
        input_shape: req.input_shape.clone(),
        apply_softmax: req.apply_softmax,
        top_k: i32::try_from(req.top_k).unwrap_or(i32::MAX),
    };
    Ok(encoded(&msg))
}

/// Decodes an inference response.
///
/// `probabilities` is surfaced only when non-empty on the wire; the
/// top-k sequences are grouped into [`TopPredictions`] and required to
/// agree in length.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed or the top-k sequences
/// disagree in length.
pub fn decode_inference(bytes: &[u8]) -> Result<MlInferenceResponse, ComputeError> {
    let msg = pb::MlInferenceResponse::decode(bytes).map_err(decode_failure)?;

    let top_predictions = if msg.top_classes.is_empty() && msg.top_probabilities.is_empty() {
        None
    } else if msg.top_classes.len() != msg.top_probabilities.len() {
        return Err(ComputeError::decode_error(format!(
            "top-k sequences disagree: {} classes vs {} probabilities",
            msg.top_classes.len(),
            msg.top_probabilities.len()
        )));
    } else {
        Some(TopPredictions {
            classes: msg.top_classes,
            probabilities: msg.top_probabilities,
        })
    };

    let probabilities = if msg.probabilities.is_empty() {
        None
    } else {
        Some(msg.probabilities)
    };

    Ok(MlInferenceResponse {
        output: msg.output,
        probabilities,
        top_predictions,
        inference_time_ms: msg.inference_time_ms,
        model_info: msg.model_info,
    })
}

/// Encodes the (empty) health check request.
#[must_use]
pub fn encode_health_check() -> Bytes {
    encoded(&pb::HealthCheckRequest {})
}

/// Decodes a health check response.
///
/// # Errors
///
/// `DecodeError` if the payload is malformed.
pub fn decode_health_check(bytes: &[u8]) -> Result<pb::HealthCheckResponse, ComputeError> {
    pb::HealthCheckResponse::decode(bytes).map_err(decode_failure)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn matrix_dims_rejects_ragged_and_empty() {
        assert!(matrix_dims("m", &[]).is_err());
        assert!(matrix_dims("m", &[vec![]]).is_err());
        assert!(matrix_dims("m", &[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert_eq!(
            matrix_dims("m", &[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(),
            (2, 2)
        );
    }

    #[test]
    fn flatten_is_row_major() {
        let flat = flatten(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn gate_requires_request_and_non_zero_value() {
        assert_eq!(gate(true, 3.5), Some(3.5));
        assert_eq!(gate(true, 0.0), None);
        assert_eq!(gate(false, 3.5), None);
    }

    #[test]
    fn wire_dims_reject_non_positive_values() {
        assert!(dim_from_wire("rows", 0).is_err());
        assert!(dim_from_wire("rows", -2).is_err());
        assert_eq!(dim_from_wire("rows", 7).unwrap(), 7);
    }
}
