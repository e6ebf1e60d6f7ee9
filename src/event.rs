//! Session events and the sinks that receive them.

use crate::error::Error;
use crate::protocol::Message;

/// An event surfaced by a [`Session`](crate::Session) to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionEvent {
    /// The peer sent a handshake request; carries the body text.
    ///
    /// The application accepts it by calling `respond_handshake`.
    Handshake(String),
    /// The peer is alive (heartbeat or handshake acknowledgement).
    Heartbeat,
    /// The peer sent an application message.
    Message(Message),
    /// The transport closed.
    Disconnect,
    /// The transport or the decoder reported an error.
    Error(Error),
}

impl SessionEvent {
    /// Short name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            SessionEvent::Handshake(_) => "handshake",
            SessionEvent::Heartbeat => "heartbeat",
            SessionEvent::Message(_) => "message",
            SessionEvent::Disconnect => "disconnect",
            SessionEvent::Error(_) => "error",
        }
    }
}

/// Receiver of session events.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: SessionEvent);
}

impl EventSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SessionEvent) {
        (**self).emit(event);
    }
}

#[cfg(feature = "async-tokio")]
impl EventSink for tokio::sync::mpsc::UnboundedSender<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        // Receiver gone means nobody is listening anymore.
        let _ = self.send(event);
    }
}
