//! NumGate gRPC client transport.
//!
//! Building blocks for talking to a gRPC backend without generated service
//! stubs:
//!
//! - [`client`] - endpoint construction and connection helpers with
//!   timeouts and HTTP/2 keepalive
//! - [`codec`] - a pass-through codec moving pre-encoded message bytes,
//!   enabling dynamic unary dispatch by method path
//! - [`retry`] - a pure retry decision (transient classification plus
//!   exponential backoff) applied by callers around unary calls
//! - [`call`] - the unary call descriptor and the [`RpcTransport`] seam
//!   implemented by connection owners and test fakes
//!
//! The crate deliberately owns no connection state: callers hold the
//! [`tonic::transport::Channel`] and decide when to create and drop it.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod call;
pub mod client;
pub mod codec;
pub mod error;
pub mod retry;

pub use call::{RpcCall, RpcTransport};
pub use client::{GrpcClientConfig, connect_channel, connect_with_stack};
pub use codec::RawCodec;
pub use error::TransportError;
pub use retry::{RetryDecision, RetryPolicy, is_transient};
