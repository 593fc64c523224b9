//! Pass-through codec for dynamic unary calls.
//!
//! tonic couples unary dispatch to a [`Codec`] that owns message
//! (de)serialization. [`RawCodec`] moves pre-encoded bytes through
//! unchanged in both directions, which lets a client issue calls through
//! [`tonic::client::Grpc`] by method path alone; protobuf encoding
//! happens upstream against plain prost structs, with no generated
//! service stubs and no build-time `protoc` requirement.

use bytes::{Buf, BufMut, Bytes};
use tonic::Status;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};

/// A codec that treats request and response messages as opaque bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl Codec for RawCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = RawEncoder;
    type Decoder = RawDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        RawEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        RawDecoder
    }
}

/// Writes already-encoded message bytes into the outgoing frame.
#[derive(Debug, Clone, Copy)]
pub struct RawEncoder;

impl Encoder for RawEncoder {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

/// Surfaces one complete response message as opaque bytes.
///
/// The gRPC framing layer hands `decode` exactly one length-delimited
/// message, so draining the buffer yields the whole payload.
#[derive(Debug, Clone, Copy)]
pub struct RawDecoder;

impl Decoder for RawDecoder {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}
