//! `tokio_util::codec` adapters for the LAN C frame format.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame, TransmitHeader, DEFAULT_MAX_FRAME};
use crate::error::FrameError;

/// An outbound envelope/body pair, framed with the writer's transmit header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub operation: Bytes,
    pub command: Bytes,
}

impl OutboundMessage {
    pub fn new(operation: impl Into<Bytes>, command: impl Into<Bytes>) -> Self {
        Self {
            operation: operation.into(),
            command: command.into(),
        }
    }
}

/// Splits an inbound byte stream into frames, buffering partial frames.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_frame: usize,
}

impl FrameDecoder {
    pub fn new(max_frame: usize) -> Self {
        Self { max_frame }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME)
    }
}

impl Decoder for FrameDecoder {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        decode_frame(src, self.max_frame)
    }
}

/// Frames outbound messages with a fixed transmit header.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    header: TransmitHeader,
}

impl FrameEncoder {
    pub fn new(header: TransmitHeader) -> Self {
        Self { header }
    }
}

impl Encoder<OutboundMessage> for FrameEncoder {
    type Error = FrameError;

    fn encode(&mut self, item: OutboundMessage, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(&self.header, &item.operation, &item.command, dst)?;
        tracing::trace!(
            operation_len = item.operation.len(),
            command_len = item.command.len(),
            "framed outbound message"
        );
        Ok(())
    }
}
