//! Typed event handlers.
//!
//! One method per event kind, every one a no-op by default, so a
//! consumer overrides only the kinds it cares about. At most one method
//! runs per dispatched record, synchronously on the dispatching thread;
//! a handler that blocks delays subsequent dispatch.

use crate::event::{EventKind, SocketEvent};

/// Per-kind callbacks for dispatched socket events.
///
/// Handler panics are not caught or wrapped by the dispatcher.
#[allow(unused_variables)]
pub trait MonitorHandler {
    fn on_connected(&mut self, event: &SocketEvent) {}
    fn on_connect_delayed(&mut self, event: &SocketEvent) {}
    fn on_connect_retried(&mut self, event: &SocketEvent) {}
    fn on_listening(&mut self, event: &SocketEvent) {}
    fn on_bind_failed(&mut self, event: &SocketEvent) {}
    fn on_accepted(&mut self, event: &SocketEvent) {}
    fn on_accept_failed(&mut self, event: &SocketEvent) {}
    fn on_closed(&mut self, event: &SocketEvent) {}
    fn on_close_failed(&mut self, event: &SocketEvent) {}
    fn on_disconnected(&mut self, event: &SocketEvent) {}
    fn on_monitor_stopped(&mut self, event: &SocketEvent) {}
    fn on_handshake_failed_no_detail(&mut self, event: &SocketEvent) {}
    fn on_handshake_succeeded(&mut self, event: &SocketEvent) {}
    fn on_handshake_failed_protocol(&mut self, event: &SocketEvent) {}
    fn on_handshake_failed_auth(&mut self, event: &SocketEvent) {}

    /// Catch-all for kinds this protocol version does not know.
    fn on_unknown(&mut self, event: &SocketEvent) {}
}

/// Handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl MonitorHandler for NoopHandler {}

/// Route one record to the handler method for its kind.
pub(crate) fn dispatch(handler: &mut dyn MonitorHandler, event: &SocketEvent) {
    match event.kind {
        EventKind::Connected => handler.on_connected(event),
        EventKind::ConnectDelayed => handler.on_connect_delayed(event),
        EventKind::ConnectRetried => handler.on_connect_retried(event),
        EventKind::Listening => handler.on_listening(event),
        EventKind::BindFailed => handler.on_bind_failed(event),
        EventKind::Accepted => handler.on_accepted(event),
        EventKind::AcceptFailed => handler.on_accept_failed(event),
        EventKind::Closed => handler.on_closed(event),
        EventKind::CloseFailed => handler.on_close_failed(event),
        EventKind::Disconnected => handler.on_disconnected(event),
        EventKind::MonitorStopped => handler.on_monitor_stopped(event),
        EventKind::HandshakeFailedNoDetail => handler.on_handshake_failed_no_detail(event),
        EventKind::HandshakeSucceeded => handler.on_handshake_succeeded(event),
        EventKind::HandshakeFailedProtocol => handler.on_handshake_failed_protocol(event),
        EventKind::HandshakeFailedAuth => handler.on_handshake_failed_auth(event),
        EventKind::Unknown => handler.on_unknown(event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        connected: usize,
        disconnected: usize,
        unknown: usize,
        last_value: i32,
    }

    impl MonitorHandler for Recording {
        fn on_connected(&mut self, event: &SocketEvent) {
            self.connected += 1;
            self.last_value = event.value;
        }

        fn on_disconnected(&mut self, _event: &SocketEvent) {
            self.disconnected += 1;
        }

        fn on_unknown(&mut self, _event: &SocketEvent) {
            self.unknown += 1;
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let mut handler = Recording::default();

        dispatch(
            &mut handler,
            &SocketEvent::new(EventKind::Connected, 9, "tcp://a"),
        );
        dispatch(
            &mut handler,
            &SocketEvent::new(EventKind::Disconnected, 0, "tcp://a"),
        );
        dispatch(
            &mut handler,
            &SocketEvent::new(EventKind::Unknown, 0, ""),
        );

        assert_eq!(handler.connected, 1);
        assert_eq!(handler.last_value, 9);
        assert_eq!(handler.disconnected, 1);
        assert_eq!(handler.unknown, 1);
    }

    #[test]
    fn test_unoverridden_kinds_are_noops() {
        let mut handler = Recording::default();
        dispatch(
            &mut handler,
            &SocketEvent::new(EventKind::Listening, 0, "tcp://b"),
        );
        assert_eq!(handler.connected, 0);

        let mut noop = NoopHandler;
        dispatch(&mut noop, &SocketEvent::new(EventKind::Closed, 0, ""));
    }
}
