//! gRPC client transport configuration and connection utilities.
//!
//! This module provides production-grade gRPC client configuration with:
//! - Configurable connect and RPC timeouts
//! - Configurable message-size limits for dense numeric payloads
//! - HTTP/2 keepalive settings for connection health
//! - Tracing spans around connection establishment
//!
//! **Note:** This module is responsible only for transport-level
//! configuration. Connection attempts are never retried here: an address
//! that cannot be reached fails immediately, and the retry budget in
//! [`crate::retry`] applies to call attempts on an established channel.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

use crate::error::TransportError;
use crate::retry::RetryPolicy;

/// Default send/receive message-size limit (100 MiB), sized for dense
/// matrix payloads.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

fn duration_to_i64_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Configuration for the gRPC client transport stack.
///
/// Retry-related fields (`max_attempts`, `base_delay`, `max_delay`) are
/// stored here for convenience but are consumed through
/// [`RetryPolicy::from`], not by the transport layer.
#[derive(Debug, Clone)]
#[must_use]
pub struct GrpcClientConfig {
    /// Timeout for establishing the initial connection.
    pub connect_timeout: Duration,

    /// Deadline applied to individual RPC attempts.
    pub rpc_timeout: Duration,

    /// Total attempts per logical operation, first call included.
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles per attempt after that.
    pub base_delay: Duration,

    /// Upper bound on the backoff duration.
    pub max_delay: Duration,

    /// Maximum size of an outgoing message, in bytes.
    pub max_send_message_size: usize,

    /// Maximum size of an incoming message, in bytes.
    pub max_recv_message_size: usize,

    /// Service name for logging and tracing.
    pub service_name: &'static str,

    /// Enable tracing output around connection establishment.
    pub enable_tracing: bool,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_send_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_recv_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            service_name: "grpc_client",
            enable_tracing: true,
        }
    }
}

impl GrpcClientConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-attempt RPC timeout.
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Set the total attempt budget used by [`RetryPolicy::from`].
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the send/receive message-size limits.
    pub fn with_message_size_limits(mut self, send: usize, recv: usize) -> Self {
        self.max_send_message_size = send;
        self.max_recv_message_size = recv;
        self
    }

    /// Disable tracing output.
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }
}

impl From<&GrpcClientConfig> for RetryPolicy {
    fn from(cfg: &GrpcClientConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay: cfg.base_delay,
            max_delay: cfg.max_delay,
        }
    }
}

/// Build a tonic `Endpoint` with timeouts and keepalive settings.
///
/// Configures:
/// - Connect timeout
/// - Per-RPC timeout
/// - TCP keepalive (30 seconds)
/// - HTTP/2 keepalive interval (30 seconds)
/// - Keepalive timeout (10 seconds)
/// - Keep alive while idle
fn build_endpoint(
    uri: String,
    cfg: &GrpcClientConfig,
) -> Result<Endpoint, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(uri)?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Establish a channel to a gRPC backend with the configured transport
/// stack.
///
/// The returned [`Channel`] is cheap to clone and multiplexes concurrent
/// calls over one HTTP/2 connection.
///
/// # Errors
///
/// Returns [`TransportError::Connect`] if the URI is invalid or the
/// transport cannot be established within the connect timeout. Connection
/// attempts are not retried.
pub async fn connect_channel(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> Result<Channel, TransportError> {
    let uri_string = uri.into();
    let span = tracing::debug_span!(
        "grpc_connect",
        service = cfg.service_name,
        uri = %uri_string
    );

    async move {
        let endpoint = build_endpoint(uri_string, cfg)?;
        let channel = endpoint.connect().await?;

        if cfg.enable_tracing {
            let connect_timeout_ms = duration_to_i64_ms(cfg.connect_timeout);
            let rpc_timeout_ms = duration_to_i64_ms(cfg.rpc_timeout);
            tracing::info!(
                service_name = cfg.service_name,
                connect_timeout_ms,
                rpc_timeout_ms,
                "gRPC client connected"
            );
        }

        Ok(channel)
    }
    .instrument(span)
    .await
}

/// Connect and wrap the channel in a client type.
///
/// # Example
///
/// ```ignore
/// use numgate_transport_grpc::client::{connect_with_stack, GrpcClientConfig};
///
/// let cfg = GrpcClientConfig::new("my_service");
/// let client: MyServiceClient<Channel> = connect_with_stack(
///     "http://localhost:50051",
///     &cfg
/// ).await?;
/// ```
///
/// # Errors
///
/// Returns [`TransportError::Connect`] if the transport cannot be
/// established; see [`connect_channel`].
pub async fn connect_with_stack<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> Result<TClient, TransportError>
where
    TClient: From<Channel>,
{
    let channel = connect_channel(uri, cfg).await?;
    Ok(TClient::from(channel))
}
