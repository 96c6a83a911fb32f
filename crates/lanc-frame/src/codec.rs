use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::uuid::{DeviceUuid, UUID_SIZE};

/// Size of the big-endian total-length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Full preamble: length (4) + source UUID (16) + destination UUID (16) + op length (2).
pub const HEADER_SIZE: usize = 38;

/// Bytes counted by the total length before the operation envelope starts.
pub const LENGTH_OVERHEAD: usize = 2 * UUID_SIZE + 2;

/// Default maximum total length accepted from the stream: 1 MiB.
pub const DEFAULT_MAX_FRAME: usize = 1024 * 1024;

const SOURCE_OFFSET: usize = LENGTH_PREFIX_SIZE;
const DESTINATION_OFFSET: usize = SOURCE_OFFSET + UUID_SIZE;
const OPERATION_LENGTH_OFFSET: usize = DESTINATION_OFFSET + UUID_SIZE;

/// Value of the total-length field for an operation/command pair.
pub fn frame_total_length(operation_len: usize, command_len: usize) -> usize {
    LENGTH_OVERHEAD + operation_len + command_len
}

/// A deframed message.
///
/// For frames sent by this client `source` is the local UUID and
/// `destination` the device UUID; replies from the device swap them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub source: DeviceUuid,
    pub destination: DeviceUuid,
    /// Schema-encoded operation envelope.
    pub operation: Bytes,
    /// Schema-encoded command body.
    pub command: Bytes,
}

impl Frame {
    /// The total wire size of this frame (prefix + header + envelope + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.operation.len() + self.command.len()
    }
}

/// Fixed 38-byte transmit preamble.
///
/// The UUID region is filled once when both identities are known; the two
/// length fields are written per message into the outgoing buffer, never
/// into shared state.
#[derive(Clone, PartialEq, Eq)]
pub struct TransmitHeader {
    preamble: [u8; HEADER_SIZE],
}

impl TransmitHeader {
    /// Prepare the preamble for a local/device identity pair.
    pub fn new(local: DeviceUuid, device: DeviceUuid) -> Self {
        let mut preamble = [0u8; HEADER_SIZE];
        preamble[SOURCE_OFFSET..DESTINATION_OFFSET].copy_from_slice(local.as_bytes());
        preamble[DESTINATION_OFFSET..OPERATION_LENGTH_OFFSET].copy_from_slice(device.as_bytes());
        Self { preamble }
    }

    /// The local (source) identity.
    pub fn local(&self) -> DeviceUuid {
        uuid_at(&self.preamble, SOURCE_OFFSET)
    }

    /// The device (destination) identity.
    pub fn device(&self) -> DeviceUuid {
        uuid_at(&self.preamble, DESTINATION_OFFSET)
    }

    /// The preamble with both length fields zeroed.
    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.preamble
    }
}

impl std::fmt::Debug for TransmitHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmitHeader")
            .field("local", &self.local())
            .field("device", &self.device())
            .finish()
    }
}

fn uuid_at(buf: &[u8], offset: usize) -> DeviceUuid {
    let mut raw = [0u8; UUID_SIZE];
    raw.copy_from_slice(&buf[offset..offset + UUID_SIZE]);
    DeviceUuid::from_bytes(raw)
}

/// Encode an operation/command pair into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬────────────┬────────────┬──────────┬───────────┬──────────┐
/// │ Total (4B)  │ Source     │ Dest       │ Op len   │ Operation │ Command  │
/// │ BE          │ UUID (16B) │ UUID (16B) │ (2B BE)  │           │          │
/// └─────────────┴────────────┴────────────┴──────────┴───────────┴──────────┘
/// ```
pub fn encode_frame(
    header: &TransmitHeader,
    operation: &[u8],
    command: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if operation.len() > u16::MAX as usize {
        return Err(FrameError::OperationTooLarge {
            size: operation.len(),
            max: u16::MAX as usize,
        });
    }
    let total = frame_total_length(operation.len(), command.len());
    if total > u32::MAX as usize {
        return Err(FrameError::FrameTooLarge {
            size: total,
            max: u32::MAX as usize,
        });
    }

    dst.reserve(LENGTH_PREFIX_SIZE + total);
    dst.put_u32(total as u32);
    dst.put_slice(&header.preamble[SOURCE_OFFSET..OPERATION_LENGTH_OFFSET]);
    dst.put_u16(operation.len() as u16);
    dst.put_slice(operation);
    dst.put_slice(command);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes exactly `total_length + 4` bytes from the buffer,
/// leaving any following frames in place.
pub fn decode_frame(src: &mut BytesMut, max_frame: usize) -> Result<Option<Frame>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let total = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
    if total < LENGTH_OVERHEAD {
        return Err(FrameError::FrameTooShort {
            declared: total,
            min: LENGTH_OVERHEAD,
        });
    }
    if total > max_frame {
        return Err(FrameError::FrameTooLarge {
            size: total,
            max: max_frame,
        });
    }
    if src.len() < LENGTH_PREFIX_SIZE + total {
        return Ok(None);
    }

    let operation_len =
        u16::from_be_bytes([src[OPERATION_LENGTH_OFFSET], src[OPERATION_LENGTH_OFFSET + 1]])
            as usize;
    let body = total - LENGTH_OVERHEAD;
    if operation_len > body {
        return Err(FrameError::InvalidOperationLength {
            operation: operation_len,
            body,
        });
    }

    let source = uuid_at(&src[..], SOURCE_OFFSET);
    let destination = uuid_at(&src[..], DESTINATION_OFFSET);

    src.advance(HEADER_SIZE);
    let operation = src.split_to(operation_len).freeze();
    let command = src.split_to(body - operation_len).freeze();

    Ok(Some(Frame {
        source,
        destination,
        operation,
        command,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> DeviceUuid {
        "00000000000000000000000000000005".parse().unwrap()
    }

    fn device() -> DeviceUuid {
        "00000000000910138001144fd71e13cb".parse().unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();

        encode_frame(&header, b"\x08\x03\x20\x01", b"\x08\x01", &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 6);

        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap().unwrap();
        assert_eq!(frame.source, local());
        assert_eq!(frame.destination, device());
        assert_eq!(frame.operation.as_ref(), b"\x08\x03\x20\x01");
        assert_eq!(frame.command.as_ref(), b"\x08\x01");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_total_length_field() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();
        encode_frame(&header, &[0xAA; 7], &[0xBB; 11], &mut buf).unwrap();

        let total = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(total, 32 + 2 + 7 + 11);
        assert_eq!(total, frame_total_length(7, 11));
        assert_eq!(u16::from_be_bytes([buf[36], buf[37]]), 7);
    }

    #[test]
    fn test_header_uuid_placement() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();
        encode_frame(&header, b"op", b"", &mut buf).unwrap();

        assert_eq!(&buf[4..20], local().as_bytes());
        assert_eq!(&buf[20..36], device().as_bytes());
        assert_eq!(&header.as_bytes()[4..20], local().as_bytes());
        assert_eq!(header.local(), local());
        assert_eq!(header.device(), device());
    }

    #[test]
    fn test_decode_incomplete_prefix() {
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00][..]);
        assert!(decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_decode_incomplete_body() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();
        encode_frame(&header, b"operation", b"command", &mut buf).unwrap();
        let full = buf.len();
        buf.truncate(full - 3);

        assert!(decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap().is_none());
        assert_eq!(buf.len(), full - 3, "partial frame must stay buffered");
    }

    #[test]
    fn test_decode_completes_after_more_bytes_arrive() {
        let header = TransmitHeader::new(local(), device());
        let mut wire = BytesMut::new();
        encode_frame(&header, b"operation", b"command", &mut wire).unwrap();

        let mut buf = BytesMut::from(&wire[..20]);
        assert!(decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap().is_none());
        buf.extend_from_slice(&wire[20..]);
        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap().unwrap();
        assert_eq!(frame.command.as_ref(), b"command");
    }

    #[test]
    fn test_decode_too_short() {
        let mut buf = BytesMut::new();
        buf.put_u32(10);
        buf.put_slice(&[0u8; 10]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_FRAME);
        assert!(matches!(result, Err(FrameError::FrameTooShort { .. })));
    }

    #[test]
    fn test_decode_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(64 * 1024 * 1024);
        let result = decode_frame(&mut buf, DEFAULT_MAX_FRAME);
        assert!(matches!(result, Err(FrameError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_decode_invalid_operation_length() {
        let mut buf = BytesMut::new();
        buf.put_u32(LENGTH_OVERHEAD as u32 + 2);
        buf.put_slice(local().as_bytes());
        buf.put_slice(device().as_bytes());
        buf.put_u16(9);
        buf.put_slice(b"ab");
        let result = decode_frame(&mut buf, DEFAULT_MAX_FRAME);
        assert!(matches!(
            result,
            Err(FrameError::InvalidOperationLength {
                operation: 9,
                body: 2
            })
        ));
    }

    #[test]
    fn test_multiple_frames_in_one_delivery() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();
        encode_frame(&header, b"first-op", b"first", &mut buf).unwrap();
        encode_frame(&header, b"second-op", b"", &mut buf).unwrap();
        encode_frame(&header, b"", b"third", &mut buf).unwrap();

        let mut frames = Vec::new();
        while let Some(frame) = decode_frame(&mut buf, DEFAULT_MAX_FRAME).unwrap() {
            frames.push(frame);
        }

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].operation.as_ref(), b"first-op");
        assert_eq!(frames[0].command.as_ref(), b"first");
        assert_eq!(frames[1].operation.as_ref(), b"second-op");
        assert!(frames[1].command.is_empty());
        assert!(frames[2].operation.is_empty());
        assert_eq!(frames[2].command.as_ref(), b"third");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_operation_too_large() {
        let header = TransmitHeader::new(local(), device());
        let mut buf = BytesMut::new();
        let op = vec![0u8; u16::MAX as usize + 1];
        let result = encode_frame(&header, &op, b"", &mut buf);
        assert!(matches!(result, Err(FrameError::OperationTooLarge { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame {
            source: local(),
            destination: device(),
            operation: Bytes::from_static(b"op"),
            command: Bytes::from_static(b"cmd"),
        };
        assert_eq!(frame.wire_size(), HEADER_SIZE + 5);
    }
}
