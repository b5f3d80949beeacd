//! Producer side of the monitor channel.
//!
//! The monitor itself never writes events; they come from the transport
//! of the socket being observed. [`Monitored`] is the boundary a socket
//! implements to accept a monitoring request, and [`EventEmitter`] is
//! the publishing handle it keeps while monitoring is active.

use std::cell::Cell;
use std::io;

use tracing::{debug, trace};

use crate::channel::{self, EventSender};
use crate::codec;
use crate::event::{EventKind, EventMask, SocketEvent};

/// A socket whose lifecycle transitions can be observed.
///
/// `start_monitor` is called by [`Monitor::attach`] after the consumer
/// end of the channel at `endpoint` is bound; the socket connects an
/// [`EventEmitter`] to that endpoint and publishes its transitions
/// through it for as long as it lives.
///
/// The monitor never owns the socket: a socket destroyed while a monitor
/// is still attached invalidates the attachment, and keeping the socket
/// alive for the attached period is the caller's responsibility.
///
/// [`Monitor::attach`]: crate::monitor::Monitor::attach
pub trait Monitored {
    /// Begin publishing lifecycle events, filtered by `events`, to the
    /// monitor channel bound at `endpoint`.
    fn start_monitor(&self, endpoint: &str, events: EventMask) -> io::Result<()>;
}

/// Publishing handle for socket lifecycle events.
///
/// Events not selected by the mask are dropped at the source. Send
/// failures are swallowed: once the consumer has detached, undelivered
/// events are discarded by contract. Dropping the emitter delivers a
/// final `MonitorStopped`, mirroring a monitored socket being closed.
#[derive(Debug)]
pub struct EventEmitter {
    tx: EventSender,
    mask: EventMask,
    stopped: Cell<bool>,
}

impl EventEmitter {
    /// Connect an emitter to the monitor channel bound at `endpoint`.
    ///
    /// # Errors
    ///
    /// Fails if no monitor has bound the endpoint, or the endpoint name
    /// is invalid.
    pub fn connect(endpoint: &str, events: EventMask) -> io::Result<Self> {
        let tx = channel::connect(endpoint)?;
        debug!(
            "[EMITTER] publishing events to {} (mask {:#06x})",
            endpoint,
            events.bits()
        );
        Ok(Self {
            tx,
            mask: events,
            stopped: Cell::new(false),
        })
    }

    /// Publish one lifecycle event.
    ///
    /// `MonitorStopped` bypasses the mask: a consumer waiting on the
    /// channel must always observe the stream ending.
    pub fn emit(&self, kind: EventKind, value: i32, address: &str) {
        if kind == EventKind::MonitorStopped {
            self.stopped.set(true);
        } else if !self.mask.contains(kind) {
            trace!("[EMITTER] {} filtered by mask", kind);
            return;
        }

        let event = SocketEvent::new(kind, value, address);
        trace!("[EMITTER] {}", event);
        let _ = self.tx.send(codec::encode(&event));
    }
}

impl Drop for EventEmitter {
    fn drop(&mut self) {
        if !self.stopped.get() {
            let stopped = SocketEvent::new(EventKind::MonitorStopped, 0, "");
            let _ = self.tx.send(codec::encode(&stopped));
        }
    }
}
