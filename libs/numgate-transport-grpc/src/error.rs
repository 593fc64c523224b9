//! Transport error types.
//!
//! Connection establishment failures and per-call failures are distinct
//! variants so a retry loop built around gRPC statuses can never consume
//! its budget on a fundamentally bad address.

use thiserror::Error;
use tonic::Status;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not be established.
    #[error("connect failed: {0}")]
    Connect(#[from] tonic::transport::Error),

    /// One RPC attempt failed with a gRPC status.
    #[error("call failed: {0}")]
    Call(#[from] Status),
}

impl TransportError {
    /// Whether this error belongs to the transient, retryable class.
    ///
    /// Connection establishment failures are never transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connect(_) => false,
            Self::Call(status) => crate::retry::is_transient(status.code()),
        }
    }

    /// The gRPC status of a failed call attempt, if this was one.
    #[must_use]
    pub fn as_status(&self) -> Option<&Status> {
        match self {
            Self::Call(status) => Some(status),
            Self::Connect(_) => None,
        }
    }
}
