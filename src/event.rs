//! Socket lifecycle event model.
//!
//! Defines the closed set of event kinds a monitored socket can report,
//! the bitmask used to select which kinds a monitor subscribes to, and
//! the decoded event record itself.

use std::fmt;
use std::ops::BitOr;

/// Kinds of socket lifecycle transitions.
///
/// The discriminant values are the wire protocol values (one bit per
/// kind, so a kind doubles as its own mask bit). `Unknown` covers values
/// emitted by newer producers that this protocol version does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Connection to a peer established.
    Connected,
    /// Synchronous connect failed, attempt continues asynchronously.
    ConnectDelayed,
    /// Asynchronous connect retry scheduled; value is the retry interval.
    ConnectRetried,
    /// Socket is listening for incoming connections.
    Listening,
    /// Bind operation failed; value is the transport errno.
    BindFailed,
    /// Incoming connection accepted.
    Accepted,
    /// Accept operation failed; value is the transport errno.
    AcceptFailed,
    /// Connection closed.
    Closed,
    /// Close operation failed; value is the transport errno.
    CloseFailed,
    /// Session was disconnected by the peer.
    Disconnected,
    /// Monitoring on this channel has stopped; always the final event.
    MonitorStopped,
    /// Handshake failed without further detail.
    HandshakeFailedNoDetail,
    /// Handshake completed successfully.
    HandshakeSucceeded,
    /// Handshake failed with a protocol violation; value is the detail code.
    HandshakeFailedProtocol,
    /// Handshake failed authentication; value is the status code.
    HandshakeFailedAuth,
    /// Event kind not known to this protocol version.
    Unknown,
}

impl EventKind {
    /// Wire value of this kind.
    ///
    /// `Unknown` has no wire value of its own and maps to zero.
    #[must_use]
    pub const fn raw(self) -> u16 {
        match self {
            Self::Connected => 0x0001,
            Self::ConnectDelayed => 0x0002,
            Self::ConnectRetried => 0x0004,
            Self::Listening => 0x0008,
            Self::BindFailed => 0x0010,
            Self::Accepted => 0x0020,
            Self::AcceptFailed => 0x0040,
            Self::Closed => 0x0080,
            Self::CloseFailed => 0x0100,
            Self::Disconnected => 0x0200,
            Self::MonitorStopped => 0x0400,
            Self::HandshakeFailedNoDetail => 0x0800,
            Self::HandshakeSucceeded => 0x1000,
            Self::HandshakeFailedProtocol => 0x2000,
            Self::HandshakeFailedAuth => 0x4000,
            Self::Unknown => 0x0000,
        }
    }

    /// Map a wire value to a kind.
    ///
    /// Unrecognized values map to `Unknown` rather than failing, so a
    /// consumer keeps working against newer producers.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0x0001 => Self::Connected,
            0x0002 => Self::ConnectDelayed,
            0x0004 => Self::ConnectRetried,
            0x0008 => Self::Listening,
            0x0010 => Self::BindFailed,
            0x0020 => Self::Accepted,
            0x0040 => Self::AcceptFailed,
            0x0080 => Self::Closed,
            0x0100 => Self::CloseFailed,
            0x0200 => Self::Disconnected,
            0x0400 => Self::MonitorStopped,
            0x0800 => Self::HandshakeFailedNoDetail,
            0x1000 => Self::HandshakeSucceeded,
            0x2000 => Self::HandshakeFailedProtocol,
            0x4000 => Self::HandshakeFailedAuth,
            _ => Self::Unknown,
        }
    }

    /// Get the event kind as a string name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::ConnectDelayed => "CONNECT_DELAYED",
            Self::ConnectRetried => "CONNECT_RETRIED",
            Self::Listening => "LISTENING",
            Self::BindFailed => "BIND_FAILED",
            Self::Accepted => "ACCEPTED",
            Self::AcceptFailed => "ACCEPT_FAILED",
            Self::Closed => "CLOSED",
            Self::CloseFailed => "CLOSE_FAILED",
            Self::Disconnected => "DISCONNECTED",
            Self::MonitorStopped => "MONITOR_STOPPED",
            Self::HandshakeFailedNoDetail => "HANDSHAKE_FAILED_NO_DETAIL",
            Self::HandshakeSucceeded => "HANDSHAKE_SUCCEEDED",
            Self::HandshakeFailedProtocol => "HANDSHAKE_FAILED_PROTOCOL",
            Self::HandshakeFailedAuth => "HANDSHAKE_FAILED_AUTH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selection of event kinds a monitor subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventMask(u16);

impl EventMask {
    /// Every defined event kind.
    pub const ALL: Self = Self(0xFFFF);

    /// Mask selecting no kinds.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether `kind` is selected by this mask.
    ///
    /// `Unknown` always passes: a kind this protocol version cannot name
    /// cannot be filtered by it either.
    #[must_use]
    pub const fn contains(self, kind: EventKind) -> bool {
        match kind {
            EventKind::Unknown => true,
            _ => self.0 & kind.raw() != 0,
        }
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        Self(kind.raw())
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<EventKind> for EventMask {
    type Output = Self;

    fn bitor(self, rhs: EventKind) -> Self {
        Self(self.0 | rhs.raw())
    }
}

impl BitOr for EventKind {
    type Output = EventMask;

    fn bitor(self, rhs: Self) -> EventMask {
        EventMask(self.raw() | rhs.raw())
    }
}

/// A decoded socket lifecycle event.
///
/// Constructed fresh per receive; immutable once decoded. The meaning of
/// `value` depends on the kind (errno, retry interval, fd).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    /// Lifecycle transition category.
    pub kind: EventKind,
    /// Kind-dependent 32-bit payload.
    pub value: i32,
    /// Peer or local address the event refers to.
    pub endpoint: String,
}

impl SocketEvent {
    /// Create an event record.
    pub fn new(kind: EventKind, value: i32, endpoint: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.endpoint.is_empty() {
            write!(f, "{} (value {})", self.kind, self.value)
        } else {
            write!(f, "{} on {} (value {})", self.kind, self.endpoint, self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [EventKind; 15] = [
        EventKind::Connected,
        EventKind::ConnectDelayed,
        EventKind::ConnectRetried,
        EventKind::Listening,
        EventKind::BindFailed,
        EventKind::Accepted,
        EventKind::AcceptFailed,
        EventKind::Closed,
        EventKind::CloseFailed,
        EventKind::Disconnected,
        EventKind::MonitorStopped,
        EventKind::HandshakeFailedNoDetail,
        EventKind::HandshakeSucceeded,
        EventKind::HandshakeFailedProtocol,
        EventKind::HandshakeFailedAuth,
    ];

    #[test]
    fn test_raw_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(EventKind::from_raw(kind.raw()), kind);
        }
    }

    #[test]
    fn test_unrecognized_raw_maps_to_unknown() {
        assert_eq!(EventKind::from_raw(0x8000), EventKind::Unknown);
        assert_eq!(EventKind::from_raw(0x0003), EventKind::Unknown);
        assert_eq!(EventKind::from_raw(0), EventKind::Unknown);
    }

    #[test]
    fn test_mask_contains() {
        let mask = EventKind::Connected | EventKind::Disconnected;
        assert!(mask.contains(EventKind::Connected));
        assert!(mask.contains(EventKind::Disconnected));
        assert!(!mask.contains(EventKind::Listening));
        assert!(EventMask::ALL.contains(EventKind::HandshakeFailedAuth));
        assert!(!EventMask::empty().contains(EventKind::Connected));
    }

    #[test]
    fn test_mask_never_filters_unknown() {
        assert!(EventMask::empty().contains(EventKind::Unknown));
        assert!(EventMask::ALL.contains(EventKind::Unknown));
    }

    #[test]
    fn test_mask_composition() {
        let mask = EventMask::from(EventKind::Listening) | EventKind::Accepted;
        assert_eq!(mask.bits(), 0x0008 | 0x0020);
        assert_eq!(EventMask::default(), EventMask::ALL);
    }

    #[test]
    fn test_event_display() {
        let event = SocketEvent::new(EventKind::Connected, 12, "tcp://127.0.0.1:5555");
        assert_eq!(event.to_string(), "CONNECTED on tcp://127.0.0.1:5555 (value 12)");

        let stopped = SocketEvent::new(EventKind::MonitorStopped, 0, "");
        assert_eq!(stopped.to_string(), "MONITOR_STOPPED (value 0)");
    }
}
