//! Integration tests for the wire codec.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeSet, HashMap};

use prost::Message;

use compute_client::codec::{self, MAX_MONTE_CARLO_DIMENSIONS, MAX_MONTE_CARLO_ITERATIONS};
use compute_client::pb;
use compute_sdk::error::ComputeError;
use compute_sdk::models::{
    MatrixMultiplyRequest, MlInferenceRequest, MonteCarloRequest, SimulationKind,
    StatisticsRequest, StatsOperation, VectorOperation, VectorOperationRequest, VectorResult,
};

fn assert_invalid(err: &ComputeError, expected_field: &str) {
    match err {
        ComputeError::InvalidRequest { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidRequest on {expected_field}, got {other}"),
    }
}

#[test]
fn matrix_request_flattens_row_major_with_dimensions() {
    let req = MatrixMultiplyRequest {
        matrix_a: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        matrix_b: vec![vec![5.0], vec![6.0]],
    };

    let bytes = codec::encode_matrix_multiply(&req).unwrap();
    let wire = pb::MatrixMultiplyRequest::decode(bytes.as_ref()).unwrap();

    assert_eq!(wire.matrix_a, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(wire.matrix_b, vec![5.0, 6.0]);
    assert_eq!((wire.rows_a, wire.cols_a, wire.cols_b), (2, 2, 1));
}

#[test]
fn matrix_validation_covers_empty_ragged_and_mismatched_operands() {
    let ragged = MatrixMultiplyRequest {
        matrix_a: vec![vec![1.0, 2.0], vec![3.0]],
        matrix_b: vec![vec![1.0]],
    };
    assert_invalid(
        &codec::encode_matrix_multiply(&ragged).unwrap_err(),
        "matrix_a",
    );

    let empty = MatrixMultiplyRequest {
        matrix_a: vec![],
        matrix_b: vec![vec![1.0]],
    };
    assert_invalid(
        &codec::encode_matrix_multiply(&empty).unwrap_err(),
        "matrix_a",
    );

    let empty_row = MatrixMultiplyRequest {
        matrix_a: vec![vec![]],
        matrix_b: vec![vec![1.0]],
    };
    assert_invalid(
        &codec::encode_matrix_multiply(&empty_row).unwrap_err(),
        "matrix_a",
    );

    // 1x2 times 3x1 cannot multiply.
    let mismatched = MatrixMultiplyRequest {
        matrix_a: vec![vec![1.0, 2.0]],
        matrix_b: vec![vec![1.0], vec![2.0], vec![3.0]],
    };
    assert_invalid(
        &codec::encode_matrix_multiply(&mismatched).unwrap_err(),
        "matrix_b",
    );
}

#[test]
fn matrix_response_reshapes_to_rows_by_cols() {
    let wire = pb::MatrixMultiplyResponse {
        result: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        rows: 3,
        cols: 2,
        computation_time_ms: 1.25,
    };

    let decoded = codec::decode_matrix_multiply(&wire.encode_to_vec()).unwrap();

    assert_eq!((decoded.rows, decoded.cols), (3, 2));
    assert_eq!(
        decoded.result,
        vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]
    );
    assert_eq!(decoded.computation_time_ms, 1.25);
}

#[test]
fn matrix_response_with_inconsistent_shape_is_rejected() {
    let short = pb::MatrixMultiplyResponse {
        result: vec![1.0, 2.0, 3.0],
        rows: 2,
        cols: 2,
        computation_time_ms: 0.0,
    };
    let err = codec::decode_matrix_multiply(&short.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));

    let negative = pb::MatrixMultiplyResponse {
        result: vec![1.0],
        rows: -1,
        cols: 1,
        computation_time_ms: 0.0,
    };
    let err = codec::decode_matrix_multiply(&negative.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));
}

#[test]
fn stats_request_carries_operation_tags_in_declaration_order() {
    let req = StatisticsRequest {
        data: vec![1.0, 2.0, 3.0],
        operations: BTreeSet::from([
            StatsOperation::Percentiles,
            StatsOperation::Mean,
            StatsOperation::Stddev,
        ]),
    };

    let bytes = codec::encode_statistics(&req).unwrap();
    let wire = pb::StatsAnalysisRequest::decode(bytes.as_ref()).unwrap();

    assert_eq!(wire.data, vec![1.0, 2.0, 3.0]);
    assert_eq!(wire.operations, vec!["mean", "stddev", "percentiles"]);
}

#[test]
fn stats_request_rejects_an_empty_sample() {
    let req = StatisticsRequest::new(vec![]);
    assert_invalid(&codec::encode_statistics(&req).unwrap_err(), "data");
}

#[test]
fn stats_response_gates_aggregates_on_request_and_value() {
    let req = StatisticsRequest {
        data: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        operations: BTreeSet::from([StatsOperation::Mean, StatsOperation::Median]),
    };
    // The backend filled stddev even though nobody asked for it.
    let wire = pb::StatsAnalysisResponse {
        mean: 3.0,
        median: 3.0,
        stddev: 1.41,
        variance: 0.0,
        min: 1.0,
        max: 5.0,
        count: 5,
        percentiles: HashMap::new(),
        computation_time_ms: 0.5,
    };

    let decoded = codec::decode_statistics(&req, &wire.encode_to_vec()).unwrap();

    assert_eq!(decoded.mean, 3.0);
    assert_eq!(decoded.median, Some(3.0));
    assert_eq!(decoded.stddev, None);
    assert_eq!(decoded.variance, None);
    assert_eq!(decoded.min, 1.0);
    assert_eq!(decoded.max, 5.0);
    assert_eq!(decoded.count, 5);
    assert_eq!(decoded.percentiles, None);
}

#[test]
fn requested_aggregate_reported_as_zero_stays_absent() {
    let req = StatisticsRequest {
        data: vec![2.0, 2.0],
        operations: BTreeSet::from([StatsOperation::Stddev]),
    };
    let wire = pb::StatsAnalysisResponse {
        mean: 2.0,
        stddev: 0.0,
        min: 2.0,
        max: 2.0,
        count: 2,
        ..pb::StatsAnalysisResponse::default()
    };

    let decoded = codec::decode_statistics(&req, &wire.encode_to_vec()).unwrap();
    assert_eq!(decoded.stddev, None);
}

#[test]
fn percentile_table_needs_both_request_and_data() {
    let mut percentiles = HashMap::new();
    percentiles.insert(25, 2.0);
    percentiles.insert(95, 4.8);
    let wire = pb::StatsAnalysisResponse {
        mean: 3.0,
        min: 1.0,
        max: 5.0,
        count: 5,
        percentiles,
        ..pb::StatsAnalysisResponse::default()
    };
    let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];

    let requested = StatisticsRequest {
        data: data.clone(),
        operations: BTreeSet::from([StatsOperation::Percentiles]),
    };
    let decoded = codec::decode_statistics(&requested, &wire.encode_to_vec()).unwrap();
    let table = decoded.percentiles.unwrap();
    assert_eq!(table.get(&25), Some(&2.0));
    assert_eq!(table.get(&95), Some(&4.8));

    let unrequested = StatisticsRequest {
        data,
        operations: BTreeSet::from([StatsOperation::Mean]),
    };
    let decoded = codec::decode_statistics(&unrequested, &wire.encode_to_vec()).unwrap();
    assert_eq!(decoded.percentiles, None);
}

#[test]
fn negative_wire_values_are_decode_errors() {
    let req = StatisticsRequest::new(vec![1.0]);

    let bad_count = pb::StatsAnalysisResponse {
        count: -3,
        ..pb::StatsAnalysisResponse::default()
    };
    let err = codec::decode_statistics(&req, &bad_count.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));

    let mut percentiles = HashMap::new();
    percentiles.insert(-50, 3.0);
    let bad_rank = pb::StatsAnalysisResponse {
        count: 1,
        percentiles,
        ..pb::StatsAnalysisResponse::default()
    };
    let err = codec::decode_statistics(&req, &bad_rank.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));
}

fn mc_request(iterations: u64) -> MonteCarloRequest {
    MonteCarloRequest::new(SimulationKind::PiEstimation, iterations)
}

#[test]
fn monte_carlo_bounds_are_enforced() {
    assert_invalid(
        &codec::encode_monte_carlo(&mc_request(0)).unwrap_err(),
        "iterations",
    );
    assert_invalid(
        &codec::encode_monte_carlo(&mc_request(MAX_MONTE_CARLO_ITERATIONS + 1)).unwrap_err(),
        "iterations",
    );

    let mut req = mc_request(1_000);
    req.dimensions = 0;
    assert_invalid(&codec::encode_monte_carlo(&req).unwrap_err(), "dimensions");
    req.dimensions = MAX_MONTE_CARLO_DIMENSIONS + 1;
    assert_invalid(&codec::encode_monte_carlo(&req).unwrap_err(), "dimensions");
}

#[test]
fn monte_carlo_request_carries_simulation_tag_and_seed() {
    let mut req = mc_request(50_000);
    req.seed = -7;

    let bytes = codec::encode_monte_carlo(&req).unwrap();
    let wire = pb::MonteCarloRequest::decode(bytes.as_ref()).unwrap();

    assert_eq!(wire.iterations, 50_000);
    assert_eq!(wire.dimensions, 2);
    assert_eq!(wire.seed, -7);
    assert_eq!(wire.simulation_type, "pi_estimation");
}

#[test]
fn monte_carlo_response_round_trips_metrics() {
    let mut additional_metrics = HashMap::new();
    additional_metrics.insert("acceptance_rate".to_owned(), 0.78);
    let wire = pb::MonteCarloResponse {
        result: 3.1418,
        confidence_interval_lower: 3.13,
        confidence_interval_upper: 3.15,
        iterations_completed: 50_000,
        additional_metrics,
        computation_time_ms: 12.0,
    };

    let decoded = codec::decode_monte_carlo(&wire.encode_to_vec()).unwrap();

    assert_eq!(decoded.result, 3.1418);
    assert_eq!(decoded.confidence_interval_lower, 3.13);
    assert_eq!(decoded.confidence_interval_upper, 3.15);
    assert_eq!(decoded.iterations_completed, 50_000);
    assert_eq!(
        decoded.additional_metrics.get("acceptance_rate"),
        Some(&0.78)
    );
}

#[test]
fn monte_carlo_response_rejects_negative_progress() {
    let wire = pb::MonteCarloResponse {
        iterations_completed: -1,
        ..pb::MonteCarloResponse::default()
    };
    let err = codec::decode_monte_carlo(&wire.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));
}

#[test]
fn cross_product_requires_three_dimensional_operands() {
    let short_a = VectorOperationRequest {
        operation: VectorOperation::CrossProduct,
        vector_a: vec![1.0, 2.0],
        vector_b: vec![3.0, 4.0, 5.0],
    };
    assert_invalid(
        &codec::encode_vector_operation(&short_a).unwrap_err(),
        "vector_a",
    );

    let short_b = VectorOperationRequest {
        operation: VectorOperation::CrossProduct,
        vector_a: vec![1.0, 2.0, 3.0],
        vector_b: vec![4.0, 5.0],
    };
    assert_invalid(
        &codec::encode_vector_operation(&short_b).unwrap_err(),
        "vector_b",
    );
}

#[test]
fn paired_operations_require_equal_lengths() {
    let req = VectorOperationRequest {
        operation: VectorOperation::DotProduct,
        vector_a: vec![1.0, 2.0, 3.0],
        vector_b: vec![4.0, 5.0],
    };
    assert_invalid(
        &codec::encode_vector_operation(&req).unwrap_err(),
        "vector_b",
    );
}

#[test]
fn norm_ignores_the_second_operand() {
    let req = VectorOperationRequest {
        operation: VectorOperation::Norm,
        vector_a: vec![3.0, 4.0],
        vector_b: vec![],
    };

    let bytes = codec::encode_vector_operation(&req).unwrap();
    let wire = pb::VectorOperationRequest::decode(bytes.as_ref()).unwrap();

    assert_eq!(wire.operation, "norm");
    assert!(wire.vector_b.is_empty());
}

#[test]
fn scalar_results_read_the_scalar_field_even_at_zero() {
    // Orthogonal vectors legitimately produce a zero dot product.
    let wire = pb::VectorOperationResponse {
        result_vector: vec![],
        result_scalar: 0.0,
        computation_time_ms: 0.1,
    };
    let decoded =
        codec::decode_vector_operation(VectorOperation::DotProduct, &wire.encode_to_vec()).unwrap();
    assert_eq!(decoded.result, VectorResult::Scalar(0.0));
}

#[test]
fn vector_results_come_back_through_the_vector_field() {
    let wire = pb::VectorOperationResponse {
        result_vector: vec![-3.0, 6.0, -3.0],
        result_scalar: 0.0,
        computation_time_ms: 0.2,
    };
    let decoded =
        codec::decode_vector_operation(VectorOperation::CrossProduct, &wire.encode_to_vec())
            .unwrap();
    assert_eq!(decoded.result, VectorResult::Vector(vec![-3.0, 6.0, -3.0]));
}

#[test]
fn missing_vector_result_is_a_decode_error() {
    let wire = pb::VectorOperationResponse::default();
    let err = codec::decode_vector_operation(VectorOperation::CrossProduct, &wire.encode_to_vec())
        .unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));
}

fn inference_request() -> MlInferenceRequest {
    MlInferenceRequest::new("resnet18", vec![0.0; 6], vec![2, 3])
}

#[test]
fn inference_request_defaults_survive_encoding() {
    let bytes = codec::encode_inference(&inference_request()).unwrap();
    let wire = pb::MlInferenceRequest::decode(bytes.as_ref()).unwrap();

    assert_eq!(wire.model_name, "resnet18");
    assert_eq!(wire.input_shape, vec![2, 3]);
    assert!(wire.apply_softmax);
    assert_eq!(wire.top_k, 5);
}

#[test]
fn inference_validation_rejects_inconsistent_requests() {
    let mut req = inference_request();
    req.input_shape = vec![2, 2];
    assert_invalid(&codec::encode_inference(&req).unwrap_err(), "input_shape");

    let mut req = inference_request();
    req.input_shape = vec![-2, -3];
    assert_invalid(&codec::encode_inference(&req).unwrap_err(), "input_shape");

    let mut req = inference_request();
    req.model_name = String::new();
    assert_invalid(&codec::encode_inference(&req).unwrap_err(), "model_name");

    let mut req = inference_request();
    req.input_data = vec![];
    req.input_shape = vec![];
    assert_invalid(&codec::encode_inference(&req).unwrap_err(), "input_data");

    let mut req = inference_request();
    req.top_k = 0;
    assert_invalid(&codec::encode_inference(&req).unwrap_err(), "top_k");
}

#[test]
fn top_k_sequences_must_pair_up() {
    let wire = pb::MlInferenceResponse {
        output: vec![0.1, 0.9],
        top_classes: vec![1, 0],
        top_probabilities: vec![0.9],
        ..pb::MlInferenceResponse::default()
    };
    let err = codec::decode_inference(&wire.encode_to_vec()).unwrap_err();
    assert!(matches!(err, ComputeError::DecodeError { .. }));
}

#[test]
fn inference_response_groups_predictions_and_elides_empty_fields() {
    let wire = pb::MlInferenceResponse {
        output: vec![0.1, 0.9],
        probabilities: vec![],
        top_classes: vec![1, 0],
        top_probabilities: vec![0.9, 0.1],
        inference_time_ms: 4.0,
        model_info: "resnet18 v2".to_owned(),
    };

    let decoded = codec::decode_inference(&wire.encode_to_vec()).unwrap();

    assert_eq!(decoded.output, vec![0.1, 0.9]);
    assert_eq!(decoded.probabilities, None);
    let top = decoded.top_predictions.unwrap();
    assert_eq!(top.classes, vec![1, 0]);
    assert_eq!(top.probabilities, vec![0.9, 0.1]);
    assert_eq!(decoded.model_info, "resnet18 v2");
}

#[test]
fn health_check_round_trips() {
    // The request message is empty and encodes to zero bytes.
    assert!(codec::encode_health_check().is_empty());

    let wire = pb::HealthCheckResponse {
        status: "healthy".to_owned(),
        uptime_seconds: 42.0,
        total_requests: 17,
        avg_response_time_ms: 2.5,
    };
    let decoded = codec::decode_health_check(&wire.encode_to_vec()).unwrap();
    assert_eq!(decoded.status, "healthy");
    assert_eq!(decoded.total_requests, 17);
}

#[test]
fn garbage_payloads_surface_as_decode_errors() {
    let garbage: &[u8] = &[0xff, 0xff, 0xff, 0xff];
    assert!(matches!(
        codec::decode_matrix_multiply(garbage).unwrap_err(),
        ComputeError::DecodeError { .. }
    ));
    assert!(matches!(
        codec::decode_monte_carlo(garbage).unwrap_err(),
        ComputeError::DecodeError { .. }
    ));
    assert!(matches!(
        codec::decode_inference(garbage).unwrap_err(),
        ComputeError::DecodeError { .. }
    ));
    assert!(matches!(
        codec::decode_health_check(garbage).unwrap_err(),
        ComputeError::DecodeError { .. }
    ));
}
