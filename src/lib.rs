//! Telltale
//!
//! Socket lifecycle event monitoring for in-process messaging runtimes:
//! - Event model and subscription masks (`event`)
//! - Fixed binary wire codec for event records (`codec`)
//! - Named pair-style monitor channels (`channel`)
//! - Transport-side publishing boundary (`emitter`)
//! - The monitor itself: attach, poll, dispatch, abort (`monitor`)
//! - Per-kind handler callbacks (`handler`)
//! - Error types (`error`)
//!
//! A [`monitor::Monitor`] attaches to one socket's event stream over an
//! internal channel and observes transport-level transitions (connects,
//! delays, disconnects, handshake outcomes) without intruding on the
//! socket's own traffic. It is pull-based: whichever thread calls
//! [`monitor::Monitor::check_event`] drives dispatch, and an
//! [`monitor::AbortHandle`] cancels an indefinite wait from any other
//! thread.

#![cfg_attr(not(test), deny(unsafe_code))]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod codec;
pub mod emitter;
pub mod error;
pub mod event;
pub mod handler;
pub mod monitor;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::emitter::{EventEmitter, Monitored};
    pub use crate::error::{Result, TelltaleError};
    pub use crate::event::{EventKind, EventMask, SocketEvent};
    pub use crate::handler::{MonitorHandler, NoopHandler};
    pub use crate::monitor::{AbortHandle, Monitor, MonitorPoll};
}
