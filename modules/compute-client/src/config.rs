//! Compute client configuration.

use std::time::Duration;

use serde::Deserialize;

use numgate_transport_grpc::client::DEFAULT_MAX_MESSAGE_SIZE;
use numgate_transport_grpc::{GrpcClientConfig, RetryPolicy};

/// Compute client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComputeClientConfig {
    // === Backend ===
    /// Backend endpoint URI.
    pub endpoint: String,

    // === Timeouts ===
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-call deadline in milliseconds.
    pub rpc_timeout_ms: u64,
    /// Health probe deadline in milliseconds.
    pub health_timeout_ms: u64,

    // === Retry ===
    /// Maximum attempts per call, first try included.
    pub max_attempts: u32,
    /// First retry delay in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Ceiling on the exponential retry delay in milliseconds.
    pub retry_max_delay_ms: u64,

    // === Message Limits ===
    /// Maximum encoded request size in bytes.
    pub max_send_message_size: usize,
    /// Maximum decoded response size in bytes.
    pub max_recv_message_size: usize,
}

impl Default for ComputeClientConfig {
    fn default() -> Self {
        Self {
            // Backend
            endpoint: "http://localhost:50051".to_owned(),

            // Timeouts
            connect_timeout_ms: 10_000,
            rpc_timeout_ms: 30_000,
            health_timeout_ms: 5_000,

            // Retry
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 10_000,

            // Message limits
            max_send_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_recv_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl ComputeClientConfig {
    /// Connection establishment timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-call deadline.
    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// Health probe deadline.
    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    /// Retry schedule derived from the configured attempt budget and
    /// delay bounds.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry_max_delay_ms))
    }

    /// Transport-level settings derived from this configuration.
    #[must_use]
    pub fn grpc(&self) -> GrpcClientConfig {
        let mut grpc = GrpcClientConfig::new("compute_client")
            .with_connect_timeout(self.connect_timeout())
            .with_rpc_timeout(self.rpc_timeout())
            .with_max_attempts(self.max_attempts)
            .with_message_size_limits(self.max_send_message_size, self.max_recv_message_size);
        grpc.base_delay = Duration::from_millis(self.retry_base_delay_ms);
        grpc.max_delay = Duration::from_millis(self.retry_max_delay_ms);
        grpc
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let cfg = ComputeClientConfig::default();
        assert_eq!(cfg.endpoint, "http://localhost:50051");
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.rpc_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.health_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn retry_policy_mirrors_the_delay_bounds() {
        let cfg = ComputeClientConfig {
            retry_base_delay_ms: 250,
            retry_max_delay_ms: 2_000,
            max_attempts: 5,
            ..ComputeClientConfig::default()
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn partial_overrides_keep_the_remaining_defaults() {
        let cfg: ComputeClientConfig =
            serde_json::from_value(serde_json::json!({"endpoint": "http://compute:50051"}))
                .unwrap();
        assert_eq!(cfg.endpoint, "http://compute:50051");
        assert_eq!(cfg.max_attempts, 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<ComputeClientConfig, _> =
            serde_json::from_value(serde_json::json!({"endpont": "http://compute:50051"}));
        assert!(parsed.is_err());
    }
}
