//! Named in-process monitor channels.
//!
//! A monitor channel is a pair-style, in-process link identified by an
//! `inproc://` name. The consumer (the monitor) binds the name and holds
//! the receiving end; the producer (the monitored socket's transport)
//! connects to the name and publishes encoded event records. A global
//! registry keeps names unique so two monitors cannot claim the same
//! channel.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use flume::{Receiver, Sender};
use std::io;

use crate::codec::EventFrames;

/// Producer end of a monitor channel.
pub type EventSender = Sender<EventFrames>;

/// Consumer end of a monitor channel.
pub type EventReceiver = Receiver<EventFrames>;

/// Global registry of bound monitor channels.
static CHANNEL_REGISTRY: once_cell::sync::Lazy<DashMap<String, EventSender>> =
    once_cell::sync::Lazy::new(DashMap::new);

/// Bind a monitor channel at `endpoint` and return both ends.
///
/// The name is claimed in the global registry until [`unbind`] releases
/// it; producers reach the channel with [`connect`].
///
/// # Errors
///
/// `InvalidInput` if the endpoint is not a valid `inproc://` name,
/// `AddrInUse` if the name is already bound by another consumer.
pub fn bind(endpoint: &str) -> io::Result<(EventSender, EventReceiver)> {
    let name = validate_and_extract_name(endpoint)?;

    // Unbounded so the producer never blocks the socket's own I/O path.
    let (tx, rx) = flume::unbounded();

    match CHANNEL_REGISTRY.entry(name.to_string()) {
        Entry::Occupied(_) => Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            format!("monitor channel '{name}' is already bound"),
        )),
        Entry::Vacant(slot) => {
            slot.insert(tx.clone());
            Ok((tx, rx))
        }
    }
}

/// Connect to a bound monitor channel, returning a producer end.
///
/// # Errors
///
/// `InvalidInput` if the endpoint is not a valid `inproc://` name,
/// `NotFound` if no consumer has bound the name yet.
pub fn connect(endpoint: &str) -> io::Result<EventSender> {
    let name = validate_and_extract_name(endpoint)?;

    if let Some(sender) = CHANNEL_REGISTRY.get(name) {
        return Ok(sender.clone());
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("monitor channel '{name}' not found (must bind before connect)"),
    ))
}

/// Release a bound monitor channel name.
///
/// Releasing a name that is not bound is a no-op, so detach stays
/// idempotent.
pub fn unbind(endpoint: &str) -> io::Result<()> {
    let name = validate_and_extract_name(endpoint)?;
    CHANNEL_REGISTRY.remove(name);
    Ok(())
}

/// Validate the endpoint format and extract the channel name.
fn validate_and_extract_name(endpoint: &str) -> io::Result<&str> {
    const PREFIX: &str = "inproc://";

    let Some(name) = endpoint.strip_prefix(PREFIX) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("monitor endpoint must start with '{PREFIX}', got: '{endpoint}'"),
        ));
    };

    if name.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "monitor endpoint name cannot be empty",
        ));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_validate_endpoint() {
        assert_eq!(validate_and_extract_name("inproc://mon").unwrap(), "mon");

        assert!(validate_and_extract_name("tcp://mon").is_err());
        assert!(validate_and_extract_name("inproc://").is_err());
        assert!(validate_and_extract_name("").is_err());
    }

    #[test]
    fn test_bind_duplicate_keeps_original() {
        let endpoint = "inproc://channel-duplicate";

        let (tx, rx) = bind(endpoint).unwrap();

        let second = bind(endpoint);
        assert_eq!(second.unwrap_err().kind(), io::ErrorKind::AddrInUse);

        // The failed rebind must not have clobbered the original binding.
        drop(tx);
        let producer = connect(endpoint).unwrap();
        producer.send(vec![Bytes::from_static(b"x")]).unwrap();
        assert_eq!(rx.try_recv().unwrap(), vec![Bytes::from_static(b"x")]);

        unbind(endpoint).unwrap();
    }

    #[test]
    fn test_connect_requires_bind() {
        let err = connect("inproc://channel-unbound").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_bind_connect_deliver() {
        let endpoint = "inproc://channel-deliver";

        let (_tx, rx) = bind(endpoint).unwrap();
        let producer = connect(endpoint).unwrap();

        let frames = vec![Bytes::from_static(b"header"), Bytes::from_static(b"addr")];
        producer.send(frames.clone()).unwrap();

        let received = rx
            .recv_timeout(std::time::Duration::from_millis(100))
            .unwrap();
        assert_eq!(received, frames);

        unbind(endpoint).unwrap();
    }

    #[test]
    fn test_unbind_idempotent_and_releases_name() {
        let endpoint = "inproc://channel-release";

        let (_tx, _rx) = bind(endpoint).unwrap();
        unbind(endpoint).unwrap();
        unbind(endpoint).unwrap();

        // Name is reusable after release.
        let rebound = bind(endpoint);
        assert!(rebound.is_ok());
        unbind(endpoint).unwrap();
    }
}
