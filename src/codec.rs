//! Event record wire codec.
//!
//! An event travels on the monitor channel as one logical message of two
//! frames: a fixed 6-byte header (event kind as u16, then the 32-bit
//! value, both in native byte order) followed by the UTF-8 endpoint
//! address with no terminator. The layout must match the transport
//! exactly for interoperability.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::event::{EventKind, SocketEvent};

/// One logical event message: header frame plus address frame.
pub type EventFrames = Vec<Bytes>;

/// Size of the fixed header frame.
pub const HEADER_LEN: usize = 6;

/// Malformed event record errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("event header too short: {0} bytes (expected {HEADER_LEN})")]
    ShortHeader(usize),

    #[error("event record missing address frame")]
    MissingAddress,

    #[error("event address is not valid UTF-8")]
    BadAddress(#[from] std::str::Utf8Error),
}

/// Encode an event into its two-frame wire form.
#[must_use]
pub fn encode(event: &SocketEvent) -> EventFrames {
    let mut header = BytesMut::with_capacity(HEADER_LEN);
    header.put_u16_ne(event.kind.raw());
    header.put_i32_ne(event.value);
    vec![header.freeze(), Bytes::copy_from_slice(event.endpoint.as_bytes())]
}

/// Decode a two-frame wire message into an event record.
///
/// A header shorter than [`HEADER_LEN`], a missing address frame, or a
/// non-UTF-8 address is an error. An unrecognized kind value is not: it
/// decodes to [`EventKind::Unknown`] so the monitor keeps working
/// against producers speaking a newer protocol revision.
pub fn decode(frames: &[Bytes]) -> Result<SocketEvent, DecodeError> {
    let header = frames.first().ok_or(DecodeError::ShortHeader(0))?;
    if header.len() < HEADER_LEN {
        return Err(DecodeError::ShortHeader(header.len()));
    }

    let raw = u16::from_ne_bytes([header[0], header[1]]);
    let value = i32::from_ne_bytes([header[2], header[3], header[4], header[5]]);

    let address = frames.get(1).ok_or(DecodeError::MissingAddress)?;
    let endpoint = std::str::from_utf8(address)?.to_string();

    Ok(SocketEvent {
        kind: EventKind::from_raw(raw),
        value,
        endpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let event = SocketEvent::new(EventKind::ConnectRetried, 250, "tcp://127.0.0.1:5555");
        let decoded = decode(&encode(&event)).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_decode_empty_endpoint() {
        let event = SocketEvent::new(EventKind::MonitorStopped, 0, "");
        let decoded = decode(&encode(&event)).unwrap();
        assert_eq!(decoded.kind, EventKind::MonitorStopped);
        assert!(decoded.endpoint.is_empty());
    }

    #[test]
    fn test_decode_negative_value() {
        let event = SocketEvent::new(EventKind::BindFailed, -98, "tcp://0.0.0.0:80");
        let decoded = decode(&encode(&event)).unwrap();
        assert_eq!(decoded.value, -98);
    }

    #[test]
    fn test_decode_short_header() {
        let frames = vec![Bytes::from_static(&[0x01, 0x00, 0x00]), Bytes::new()];
        assert!(matches!(decode(&frames), Err(DecodeError::ShortHeader(3))));
        assert!(matches!(decode(&[]), Err(DecodeError::ShortHeader(0))));
    }

    #[test]
    fn test_decode_missing_address() {
        let mut header = BytesMut::new();
        header.put_u16_ne(EventKind::Connected.raw());
        header.put_i32_ne(0);
        let frames = vec![header.freeze()];
        assert!(matches!(decode(&frames), Err(DecodeError::MissingAddress)));
    }

    #[test]
    fn test_decode_bad_utf8_address() {
        let mut header = BytesMut::new();
        header.put_u16_ne(EventKind::Connected.raw());
        header.put_i32_ne(0);
        let frames = vec![header.freeze(), Bytes::from_static(&[0xff, 0xfe])];
        assert!(matches!(decode(&frames), Err(DecodeError::BadAddress(_))));
    }

    #[test]
    fn test_decode_unknown_kind_is_not_an_error() {
        let mut header = BytesMut::new();
        header.put_u16_ne(0x8000);
        header.put_i32_ne(7);
        let frames = vec![header.freeze(), Bytes::from_static(b"tcp://host:1")];
        let decoded = decode(&frames).unwrap();
        assert_eq!(decoded.kind, EventKind::Unknown);
        assert_eq!(decoded.value, 7);
        assert_eq!(decoded.endpoint, "tcp://host:1");
    }
}
