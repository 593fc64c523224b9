//! Unary call descriptor and the transport seam.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;

use crate::error::TransportError;

/// One unary RPC attempt: method path, encoded payload, deadline.
///
/// The payload is an immutable [`Bytes`] value; a retry loop reuses the
/// same descriptor for every attempt instead of re-encoding.
#[derive(Debug, Clone)]
pub struct RpcCall {
    /// Fully-qualified gRPC method path (`/package.Service/Method`).
    pub method: PathAndQuery,

    /// Encoded request message.
    pub payload: Bytes,

    /// Deadline for this single attempt, any lazy connection
    /// establishment included.
    pub timeout: Duration,
}

impl RpcCall {
    /// Create a call descriptor.
    #[must_use]
    pub fn new(method: PathAndQuery, payload: Bytes, timeout: Duration) -> Self {
        Self {
            method,
            payload,
            timeout,
        }
    }
}

/// A transport capable of performing single unary attempts.
///
/// The production implementation owns a [`tonic::transport::Channel`];
/// tests substitute fakes that script failures without a live backend.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Perform exactly one attempt of `call`.
    ///
    /// Implementations bound the whole attempt, any dial included, by
    /// [`RpcCall::timeout`].
    ///
    /// # Errors
    ///
    /// [`TransportError::Connect`] if no transport could be established,
    /// [`TransportError::Call`] if the attempt itself failed or timed out.
    async fn invoke(&self, call: &RpcCall) -> Result<Bytes, TransportError>;

    /// Release any underlying transport resources.
    ///
    /// Default is a no-op; implementations owning a connection drop it
    /// here. Must be safe to call more than once.
    async fn shutdown(&self) {}
}
