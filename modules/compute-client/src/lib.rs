//! Compute Gateway Client Module
//!
//! This module implements [`compute_sdk::ComputeGatewayApi`] over gRPC:
//! it validates and encodes domain requests, dispatches them to the
//! numerical compute backend as dynamic unary calls, retries transient
//! failures with exponential backoff, and folds backend health into a
//! never-failing probe.
//!
//! Layering, outermost first:
//!
//! - [`client`] - the [`ComputeGatewayClient`] orchestrator (retry loop,
//!   error taxonomy, telemetry)
//! - [`health`] - the single-attempt health probe
//! - [`codec`] - pure translation between domain models and wire messages
//! - [`connection`] - lazy shared-channel ownership implementing the
//!   transport seam
//! - [`pb`] - hand-maintained protobuf message mirror
//! - [`config`] - deserializable module configuration
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod health;
pub mod pb;

// Re-export main types at crate root
pub use client::ComputeGatewayClient;
pub use config::ComputeClientConfig;
pub use connection::ConnectionManager;
pub use health::HealthAggregator;
