//! Length-prefixed stream framing for the LAN C protocol.
//!
//! Every message on the stream connection is framed as:
//! - A 4-byte big-endian total length (everything after the prefix)
//! - The 16-byte source UUID and 16-byte destination UUID
//! - A 2-byte big-endian operation envelope length
//! - The operation envelope followed by the command body
//!
//! Decoding buffers partial frames, so callers always get complete frames.

pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod uuid;

pub use codec::{
    decode_frame, encode_frame, frame_total_length, Frame, TransmitHeader, DEFAULT_MAX_FRAME,
    HEADER_SIZE, LENGTH_OVERHEAD, LENGTH_PREFIX_SIZE,
};
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use framed::{FrameDecoder, FrameEncoder, OutboundMessage};
pub use uuid::DeviceUuid;
