//! Socket event monitor.
//!
//! A [`Monitor`] observes the lifecycle transitions of one socket
//! without touching the socket's own send/receive traffic. It owns the
//! consumer end of a named monitor channel; the observed socket's
//! transport publishes encoded event records onto that channel, and the
//! monitor pulls, decodes, and dispatches them from whichever thread
//! drives it.
//!
//! The monitor is passive and single-consumer. The one cross-thread
//! entry point is [`AbortHandle`], which unblocks an indefinite wait on
//! another thread by injecting the terminal record directly into the
//! channel instead of relying on the blocked loop to re-poll.
//!
//! ```no_run
//! use std::time::Duration;
//! use telltale::monitor::{Monitor, MonitorPoll};
//! # use telltale::emitter::Monitored;
//! # fn observe(socket: &impl Monitored) -> telltale::error::Result<()> {
//! let mut monitor = Monitor::new();
//! monitor.attach(socket, "inproc://monitor-client")?;
//!
//! loop {
//!     match monitor.recv_event(Some(Duration::from_millis(100)))? {
//!         MonitorPoll::Event(event) => println!("{event}"),
//!         MonitorPoll::Timeout => continue,
//!         MonitorPoll::Closed => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flume::{RecvTimeoutError, TryRecvError};
use tracing::{debug, warn};

use crate::channel::{self, EventReceiver, EventSender};
use crate::codec;
use crate::emitter::Monitored;
use crate::error::{Result, TelltaleError};
use crate::event::{EventKind, EventMask, SocketEvent};
use crate::handler::{self, MonitorHandler};

/// Outcome of one receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorPoll {
    /// A decoded event record.
    Event(SocketEvent),
    /// No event arrived within the wait window; retry later.
    Timeout,
    /// The monitoring session has ended (abort, stop, or producer gone).
    Closed,
}

/// Live attachment state: present exactly while the monitor is attached.
#[derive(Debug)]
struct Attachment {
    rx: EventReceiver,
    /// Bound producer end, kept for abort injection.
    tx: EventSender,
    endpoint: String,
    /// Sticky: once set, every receive reports `Closed`.
    aborted: Arc<AtomicBool>,
}

/// Observer for one socket's lifecycle events.
///
/// Default-constructed monitors are uninitialized; [`attach`] binds the
/// monitor channel and starts the session, [`detach`] (or drop) ends it.
/// The attachment is an exclusively owned resource: moving a `Monitor`
/// transfers the open channel endpoint whole, and the compiler retires
/// the moved-from binding, so the endpoint is closed exactly once.
///
/// Not safe for concurrent use from multiple threads, except through
/// [`AbortHandle`].
///
/// [`attach`]: Monitor::attach
/// [`detach`]: Monitor::detach
#[derive(Debug, Default)]
pub struct Monitor {
    attached: Option<Attachment>,
}

impl Monitor {
    /// Create an uninitialized monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the monitor currently holds an open channel endpoint.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Endpoint name of the current attachment, for diagnostics.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.attached.as_ref().map(|a| a.endpoint.as_str())
    }

    /// Attach to `target`, observing every event kind.
    ///
    /// See [`attach_filtered`](Monitor::attach_filtered).
    pub fn attach(&mut self, target: &impl Monitored, endpoint: &str) -> Result<()> {
        self.attach_filtered(target, endpoint, EventMask::ALL)
    }

    /// Attach to `target`, observing the kinds selected by `events`.
    ///
    /// Binds the consumer end of the monitor channel at `endpoint`, then
    /// asks the target socket to publish its lifecycle events there.
    /// `endpoint` must be an `inproc://` name unique to this attachment.
    /// Events that fired before the attachment are not delivered.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::AlreadyAttached`] if a session is active (the
    /// existing registration is never silently replaced), or
    /// [`TelltaleError::Channel`] if the endpoint is already bound or
    /// the target rejects the registration.
    pub fn attach_filtered(
        &mut self,
        target: &impl Monitored,
        endpoint: &str,
        events: EventMask,
    ) -> Result<()> {
        if self.attached.is_some() {
            return Err(TelltaleError::AlreadyAttached);
        }

        let (tx, rx) = channel::bind(endpoint)?;
        if let Err(err) = target.start_monitor(endpoint, events) {
            // Roll back the binding so the name stays reusable.
            let _ = channel::unbind(endpoint);
            return Err(TelltaleError::Channel(err));
        }

        debug!(
            "[MONITOR] attached to {} (mask {:#06x})",
            endpoint,
            events.bits()
        );
        self.attached = Some(Attachment {
            rx,
            tx,
            endpoint: endpoint.to_string(),
            aborted: Arc::new(AtomicBool::new(false)),
        });
        Ok(())
    }

    /// End the session and release the channel endpoint.
    ///
    /// Buffered-but-undelivered events are discarded. Idempotent:
    /// detaching an uninitialized monitor is a no-op.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::Channel`] if releasing the endpoint fails.
    pub fn detach(&mut self) -> Result<()> {
        if let Some(att) = self.attached.take() {
            channel::unbind(&att.endpoint)?;
            debug!("[MONITOR] detached from {}", att.endpoint);
        }
        Ok(())
    }

    /// Abort the session from the owning thread.
    ///
    /// Marks the session closed and detaches. For cancelling a receive
    /// that is blocked on another thread, use [`abort_handle`].
    ///
    /// # Errors
    ///
    /// [`TelltaleError::Channel`] if releasing the endpoint fails.
    ///
    /// [`abort_handle`]: Monitor::abort_handle
    pub fn abort(&mut self) -> Result<()> {
        if let Some(att) = &self.attached {
            att.aborted.store(true, Ordering::SeqCst);
            debug!("[MONITOR] aborting session on {}", att.endpoint);
        }
        self.detach()
    }

    /// Cross-thread cancellation handle for the current session.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::NotAttached`] if no session is active.
    pub fn abort_handle(&self) -> Result<AbortHandle> {
        let att = self.attached.as_ref().ok_or(TelltaleError::NotAttached)?;
        Ok(AbortHandle {
            tx: att.tx.clone(),
            aborted: Arc::clone(&att.aborted),
        })
    }

    /// Raw consumer end of the monitor channel, for external
    /// multiplexing.
    ///
    /// Readiness means one or more event records are queued. After an
    /// external poll reports readiness, drain with
    /// `recv_event(Some(Duration::ZERO))`; do not receive from the
    /// handle directly or records bypass decode and abort tracking.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::NotAttached`] if no session is active.
    pub fn channel(&self) -> Result<&EventReceiver> {
        self.attached
            .as_ref()
            .map(|a| &a.rx)
            .ok_or(TelltaleError::NotAttached)
    }

    /// Receive and decode one event record.
    ///
    /// `timeout` follows the usual convention: `None` blocks
    /// indefinitely, `Some(Duration::ZERO)` polls without blocking, any
    /// other duration bounds the wait.
    ///
    /// Returns [`MonitorPoll::Timeout`] when no record arrived in the
    /// window and [`MonitorPoll::Closed`] once the session has ended. A
    /// `MonitorStopped` record is returned like any other event, but
    /// marks the session closed for every subsequent call. A malformed
    /// record degrades to [`EventKind::Unknown`] instead of failing, so
    /// protocol drift never takes the loop down.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::NotAttached`] if no session is active.
    pub fn recv_event(&mut self, timeout: Option<Duration>) -> Result<MonitorPoll> {
        let att = self.attached.as_ref().ok_or(TelltaleError::NotAttached)?;
        if att.aborted.load(Ordering::SeqCst) {
            return Ok(MonitorPoll::Closed);
        }

        let frames = match timeout {
            Some(d) if d.is_zero() => match att.rx.try_recv() {
                Ok(frames) => frames,
                Err(TryRecvError::Empty) => return Ok(MonitorPoll::Timeout),
                Err(TryRecvError::Disconnected) => return Ok(MonitorPoll::Closed),
            },
            Some(d) => match att.rx.recv_timeout(d) {
                Ok(frames) => frames,
                Err(RecvTimeoutError::Timeout) => return Ok(MonitorPoll::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Ok(MonitorPoll::Closed),
            },
            None => match att.rx.recv() {
                Ok(frames) => frames,
                Err(_) => return Ok(MonitorPoll::Closed),
            },
        };

        let event = match codec::decode(&frames) {
            Ok(event) => event,
            Err(err) => {
                warn!("[MONITOR] malformed event record: {}", err);
                SocketEvent::new(EventKind::Unknown, 0, "")
            }
        };

        if event.kind == EventKind::MonitorStopped {
            att.aborted.store(true, Ordering::SeqCst);
        }

        Ok(MonitorPoll::Event(event))
    }

    /// Receive one event and dispatch it to `handler`.
    ///
    /// Returns `Ok(true)` after dispatching a live event. Returns
    /// `Ok(false)` on timeout, on a closed session, or after dispatching
    /// the terminal `MonitorStopped` record (the handler's
    /// `on_monitor_stopped` still runs first). The canonical loop is
    /// `while monitor.check_event(timeout, &mut handler)? {}` — a
    /// `false` from a bounded timeout only means "nothing yet" as long
    /// as the session is still live.
    ///
    /// # Errors
    ///
    /// [`TelltaleError::NotAttached`] if no session is active.
    pub fn check_event(
        &mut self,
        timeout: Option<Duration>,
        handler: &mut dyn MonitorHandler,
    ) -> Result<bool> {
        match self.recv_event(timeout)? {
            MonitorPoll::Event(event) => {
                handler::dispatch(handler, &event);
                Ok(event.kind != EventKind::MonitorStopped)
            }
            MonitorPoll::Timeout | MonitorPoll::Closed => Ok(false),
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        let _ = self.detach();
    }
}

/// Cross-thread cancellation for a monitoring session.
///
/// Cloneable and `Send`; obtained from [`Monitor::abort_handle`] while
/// attached. The handle stays valid for the session it was created for
/// and turns into a no-op once that session is gone.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: EventSender,
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// End the session, unblocking any receive currently waiting.
    ///
    /// Sets the sticky closed flag, then injects a terminal
    /// `MonitorStopped` record so a receiver blocked indefinitely wakes
    /// within channel latency rather than waiting for its next poll.
    /// The injection bypasses the emitter's mask.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        let stopped = SocketEvent::new(EventKind::MonitorStopped, 0, "");
        let _ = self.tx.send(codec::encode(&stopped));
    }
}
