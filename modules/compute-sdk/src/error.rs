//! Error types for the compute gateway.
//!
//! One taxonomy covers the whole call path: local validation, channel
//! establishment, per-attempt RPC failures, retry exhaustion, and response
//! decoding. The gRPC client maps transport errors into these variants at
//! its boundary; no tonic types leak through.

use thiserror::Error;

/// Errors that can occur when using the compute gateway API.
#[derive(Debug, Clone, Error)]
pub enum ComputeError {
    /// The request failed local validation and was never sent.
    #[error("invalid request: {field}: {reason}")]
    InvalidRequest {
        /// The offending request field.
        field: String,
        /// What the field violated.
        reason: String,
    },

    /// The backend channel could not be established.
    ///
    /// Never retried: a connect failure fails the operation immediately.
    #[error("connect failed: {reason}")]
    ConnectFailed {
        /// Underlying transport error description.
        reason: String,
    },

    /// A single RPC attempt failed.
    #[error("call failed: {code}: {message}")]
    CallFailed {
        /// Snake-case gRPC status code name (e.g. `unavailable`).
        code: String,
        /// Status message from the backend or transport.
        message: String,
    },

    /// Consecutive transient failures used up the retry budget.
    ///
    /// Wraps the final attempt's failure unchanged so the root cause stays
    /// visible.
    #[error("retry budget exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Number of attempts performed.
        attempts: u32,
        /// The final attempt's failure.
        last: Box<ComputeError>,
    },

    /// The requested model is not available on the backend.
    #[error("model not found: {model_name}")]
    ModelNotFound {
        /// The model that was requested.
        model_name: String,
    },

    /// The backend answered with a malformed or inconsistent payload.
    #[error("decode error: {reason}")]
    DecodeError {
        /// What made the payload undecodable.
        reason: String,
    },
}

impl ComputeError {
    /// Builds a [`ComputeError::InvalidRequest`] for a named field.
    #[must_use]
    pub fn invalid_request(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`ComputeError::ConnectFailed`].
    #[must_use]
    pub fn connect_failed(reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            reason: reason.into(),
        }
    }

    /// Builds a [`ComputeError::CallFailed`] from a status code name and
    /// message.
    #[must_use]
    pub fn call_failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Wraps the final per-attempt failure after the budget is gone.
    #[must_use]
    pub fn retry_exhausted(attempts: u32, last: ComputeError) -> Self {
        Self::RetryExhausted {
            attempts,
            last: Box::new(last),
        }
    }

    /// Builds a [`ComputeError::ModelNotFound`].
    #[must_use]
    pub fn model_not_found(model_name: impl Into<String>) -> Self {
        Self::ModelNotFound {
            model_name: model_name.into(),
        }
    }

    /// Builds a [`ComputeError::DecodeError`].
    #[must_use]
    pub fn decode_error(reason: impl Into<String>) -> Self {
        Self::DecodeError {
            reason: reason.into(),
        }
    }

    /// `true` when one more attempt of the same call could plausibly
    /// succeed.
    ///
    /// Only per-attempt failures in the transient class (`unavailable`,
    /// `deadline_exceeded`) qualify; everything else, including connect
    /// failures and exhausted retries, is final.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::CallFailed { code, .. } if code == "unavailable" || code == "deadline_exceeded"
        )
    }

    /// HTTP status the presentation layer should map this error to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 422,
            Self::ConnectFailed { .. } | Self::CallFailed { .. } | Self::DecodeError { .. } => 502,
            Self::RetryExhausted { .. } => 503,
            Self::ModelNotFound { .. } => 404,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_and_reason() {
        let err = ComputeError::invalid_request("matrix_a", "must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid request: matrix_a: must not be empty"
        );
    }

    #[test]
    fn retry_exhausted_keeps_the_root_cause_visible() {
        let last = ComputeError::call_failed("unavailable", "connection reset");
        let err = ComputeError::retry_exhausted(3, last);
        let rendered = err.to_string();
        assert!(rendered.contains("after 3 attempts"));
        assert!(rendered.contains("connection reset"));
    }

    #[test]
    fn only_transient_call_failures_are_retriable() {
        assert!(ComputeError::call_failed("unavailable", "").is_retriable());
        assert!(ComputeError::call_failed("deadline_exceeded", "").is_retriable());
        assert!(!ComputeError::call_failed("internal", "boom").is_retriable());
        assert!(!ComputeError::connect_failed("refused").is_retriable());
        assert!(
            !ComputeError::retry_exhausted(3, ComputeError::call_failed("unavailable", ""))
                .is_retriable()
        );
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(ComputeError::invalid_request("f", "r").status_code(), 422);
        assert_eq!(ComputeError::connect_failed("r").status_code(), 502);
        assert_eq!(ComputeError::model_not_found("m").status_code(), 404);
        assert_eq!(
            ComputeError::retry_exhausted(3, ComputeError::call_failed("unavailable", ""))
                .status_code(),
            503
        );
    }
}
