//! Error types for monitor operations.

use std::io;
use thiserror::Error;

use crate::codec::DecodeError;

/// Main error type for monitor operations.
///
/// Timeouts and channel shutdown are not errors; they are normal
/// [`MonitorPoll`](crate::monitor::MonitorPoll) outcomes.
#[derive(Debug, Error)]
pub enum TelltaleError {
    /// Operation requires the monitor to be attached first.
    #[error("monitor is not attached to a socket")]
    NotAttached,

    /// `attach` called on a monitor that is already attached.
    #[error("monitor is already attached to a socket")]
    AlreadyAttached,

    /// Channel registration, open, or close failed at the transport
    /// boundary.
    #[error("monitor channel error: {0}")]
    Channel(#[from] io::Error),

    /// Malformed event record.
    #[error("event decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, TelltaleError>;

impl TelltaleError {
    /// Whether this error reflects a lifecycle misuse rather than a
    /// transport failure.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self, Self::NotAttached | Self::AlreadyAttached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(TelltaleError::NotAttached.is_state_error());
        assert!(TelltaleError::AlreadyAttached.is_state_error());
        assert!(!TelltaleError::Channel(io::Error::new(
            io::ErrorKind::AddrInUse,
            "bound"
        ))
        .is_state_error());
    }
}
