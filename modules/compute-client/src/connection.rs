//! Shared channel lifecycle for the compute backend.
//!
//! [`ConnectionManager`] owns at most one [`Channel`] at a time,
//! established lazily on the first call and handed out as cheap clones
//! afterwards. The slot lock is held across connection establishment so
//! concurrent first calls share a single dial instead of racing.

use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tonic::client::Grpc;
use tonic::transport::Channel;
use tonic::{Request, Status};

use numgate_transport_grpc::client::connect_channel;
use numgate_transport_grpc::{GrpcClientConfig, RawCodec, RpcCall, RpcTransport, TransportError};

use crate::config::ComputeClientConfig;

/// Lazily-connected, shared gRPC channel to the compute backend.
pub struct ConnectionManager {
    endpoint: String,
    grpc: GrpcClientConfig,
    channel: Mutex<Option<Channel>>,
}

impl ConnectionManager {
    /// Create a manager for the configured endpoint. No connection is
    /// attempted until the first [`acquire`](Self::acquire).
    #[must_use]
    pub fn new(config: &ComputeClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            grpc: config.grpc(),
            channel: Mutex::new(None),
        }
    }

    /// Return the shared channel, establishing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the endpoint cannot be
    /// reached within the connect timeout. Connection attempts are not
    /// retried.
    pub async fn acquire(&self) -> Result<Channel, TransportError> {
        self.acquire_with(connect_channel(self.endpoint.as_str(), &self.grpc))
            .await
    }

    /// Shared-slot discipline behind [`acquire`](Self::acquire): the
    /// `connect` future is polled only when the slot is empty, which is
    /// what the singleton tests rely on.
    async fn acquire_with(
        &self,
        connect: impl Future<Output = Result<Channel, TransportError>> + Send,
    ) -> Result<Channel, TransportError> {
        let mut slot = self.channel.lock().await;
        if let Some(channel) = slot.as_ref() {
            return Ok(channel.clone());
        }
        let channel = connect.await?;
        *slot = Some(channel.clone());
        Ok(channel)
    }

    /// Drop the cached channel, if any. Safe to call more than once; a
    /// later [`acquire`](Self::acquire) re-establishes on demand.
    pub async fn release(&self) {
        let mut slot = self.channel.lock().await;
        if slot.take().is_some() {
            tracing::info!(endpoint = %self.endpoint, "compute channel released");
        }
    }

    /// Whether a channel is currently cached.
    pub async fn is_connected(&self) -> bool {
        self.channel.lock().await.is_some()
    }

    /// Timed attempt behind [`RpcTransport::invoke`]: the dial and the
    /// unary exchange run inside one `call.timeout` window, which is
    /// what the deadline tests rely on.
    async fn invoke_with(
        &self,
        call: &RpcCall,
        connect: impl Future<Output = Result<Channel, TransportError>> + Send,
    ) -> Result<Bytes, TransportError> {
        let attempt = async {
            let channel = self.acquire_with(connect).await?;
            let mut grpc = Grpc::new(channel)
                .max_encoding_message_size(self.grpc.max_send_message_size)
                .max_decoding_message_size(self.grpc.max_recv_message_size);

            // A channel that cannot serve the call right now is the same
            // failure as the backend being down, so it keeps the same
            // retryable status code.
            grpc.ready()
                .await
                .map_err(|e| Status::unavailable(format!("service not ready: {e}")))?;
            let mut request = Request::new(call.payload.clone());
            request.set_timeout(call.timeout);
            let response = grpc.unary(request, call.method.clone(), RawCodec).await?;
            Ok::<Bytes, TransportError>(response.into_inner())
        };

        // The per-request grpc-timeout header covers the server side; the
        // local clock bounds the whole attempt, dial included, even if
        // the transport stalls before the request leaves.
        let reply = tokio::time::timeout(call.timeout, attempt)
            .await
            .map_err(|_| Status::deadline_exceeded("attempt deadline exceeded"))??;
        Ok(reply)
    }
}

#[async_trait]
impl RpcTransport for ConnectionManager {
    async fn invoke(&self, call: &RpcCall) -> Result<Bytes, TransportError> {
        self.invoke_with(call, connect_channel(self.endpoint.as_str(), &self.grpc))
            .await
    }

    async fn shutdown(&self) {
        self.release().await;
    }
}
