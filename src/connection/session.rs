use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::{Config, DecodeFailurePolicy};
use crate::connection::{SessionId, SessionState};
use crate::error::Error;
use crate::event::{EventSink, SessionEvent};
use crate::payload::Payload;
use crate::protocol::package::{self, Frame, PackageType};
use crate::protocol::{HEADER_LEN, Message, decode_utf8, message};
use crate::transport::{RemoteAddress, Transport};

type Handler<T, S> = fn(&mut Session<T, S>, Bytes);

/// Fixed dispatch table from inbound package type to handler.
///
/// Kick and unknown types have no handler and are ignored.
fn handler_for<T: Transport, S: EventSink>(kind: PackageType) -> Option<Handler<T, S>> {
    match kind {
        PackageType::Handshake => Some(Session::handle_handshake),
        PackageType::HandshakeAck => Some(Session::handle_handshake_ack),
        PackageType::Heartbeat => Some(Session::handle_heartbeat),
        PackageType::Data => Some(Session::handle_data),
        PackageType::Kick | PackageType::Other(_) => None,
    }
}

/// A handshake-gated session over one message-framed transport.
///
/// `Session` owns its transport exclusively and reports everything it
/// observes to an [`EventSink`]. It performs no I/O scheduling of its own:
/// the owner feeds inbound data through [`on_bytes`](Self::on_bytes),
/// [`on_transport_close`](Self::on_transport_close) and
/// [`on_transport_error`](Self::on_transport_error), and calls the outbound
/// operations from the same execution context.
///
/// Outbound operations never fail loudly. A call that is not allowed in the
/// current state is a no-op and returns `false`.
///
/// ## Example
///
/// ```rust,ignore
/// use hybridsock::{Session, SessionEvent};
///
/// let mut events = Vec::new();
/// let mut session = Session::new("s1", transport, &mut events);
///
/// session.on_bytes(&handshake_package);
/// session.respond_handshake(handshake_response);
/// session.on_bytes(&handshake_ack_package);
/// session.send(serde_json::json!({"foo": 1}));
/// session.disconnect();
/// ```
#[derive(Debug)]
pub struct Session<T, S> {
    id: SessionId,
    remote: RemoteAddress,
    state: SessionState,
    transport: T,
    sink: S,
    config: Config,
    disconnect_emitted: bool,
}

impl<T: Transport, S: EventSink> Session<T, S> {
    /// Create a session in the `Init` state with default configuration.
    pub fn new(id: impl Into<SessionId>, transport: T, sink: S) -> Self {
        Self::with_config(id, transport, sink, Config::default())
    }

    /// Create a session in the `Init` state.
    ///
    /// The peer address is read from the transport once, here.
    pub fn with_config(id: impl Into<SessionId>, transport: T, sink: S, config: Config) -> Self {
        let id = id.into();
        let remote = transport.remote_address();
        debug!(session = %id, peer = %remote, "session created");
        Self {
            id,
            remote,
            state: SessionState::Init,
            transport,
            sink,
            config,
            disconnect_emitted: false,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Peer address captured at construction.
    pub fn remote_address(&self) -> RemoteAddress {
        self.remote
    }

    /// Get the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The event sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the event sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the session, returning transport and sink.
    pub fn into_parts(self) -> (T, S) {
        (self.transport, self.sink)
    }

    /// Send an application payload wrapped in a `Data` package.
    ///
    /// Only allowed in `Working`. Returns `true` if bytes reached the
    /// transport. Payloads that cannot be packaged are reported as an
    /// `Error` event.
    pub fn send(&mut self, payload: impl Into<Payload>) -> bool {
        if !self.state.can_send() {
            trace!(session = %self.id, state = %self.state, "send ignored");
            return false;
        }

        match self.package(payload.into()) {
            Ok(bytes) => {
                self.transport.send(bytes);
                true
            }
            Err(err) => {
                debug!(session = %self.id, error = %err, "payload rejected");
                self.sink.emit(SessionEvent::Error(err));
                false
            }
        }
    }

    /// Send every payload in order, as if by repeated [`send`](Self::send).
    ///
    /// Returns how many payloads reached the transport.
    pub fn send_batch<I>(&mut self, payloads: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<Payload>,
    {
        payloads
            .into_iter()
            .map(|payload| self.send(payload))
            .filter(|sent| *sent)
            .count()
    }

    /// Write pre-framed bytes regardless of handshake progress.
    ///
    /// Allowed in every state except `Closed`.
    pub fn send_force(&mut self, data: impl Into<Bytes>) -> bool {
        if !self.state.can_force_send() {
            trace!(session = %self.id, "send_force ignored on closed session");
            return false;
        }
        self.transport.send(data.into());
        true
    }

    /// Answer the peer's handshake and wait for its acknowledgement.
    ///
    /// Only allowed in `Init`; moves the session to `WaitAck`.
    pub fn respond_handshake(&mut self, data: impl Into<Bytes>) -> bool {
        if !self.state.can_respond_handshake() {
            trace!(session = %self.id, state = %self.state, "handshake response ignored");
            return false;
        }
        self.transport.send(data.into());
        self.set_state(SessionState::WaitAck);
        true
    }

    /// Close the session and its transport.
    ///
    /// Idempotent: the transport is closed at most once. Returns `true` if
    /// this call performed the close.
    pub fn disconnect(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.set_state(SessionState::Closed);
        self.transport.close();
        true
    }

    /// Feed bytes received from the transport.
    ///
    /// The buffer may hold several packages back to back; each one is
    /// dispatched in order. A header announcing a body above
    /// `Limits::max_body_size` is a decode failure.
    pub fn on_bytes(&mut self, data: &[u8]) {
        let mut offset = 0;
        while offset < data.len() && self.state.is_active() {
            let rest = &data[offset..];
            if rest.len() >= HEADER_LEN {
                if let Err(err) = self.config.limits.check_body_size(package::body_len(rest)) {
                    self.decode_failed(err);
                    return;
                }
            }
            match Frame::parse(rest) {
                Ok((frame, consumed)) => {
                    offset += consumed;
                    self.dispatch(frame);
                }
                Err(err) => {
                    self.decode_failed(err);
                    return;
                }
            }
        }

        if offset < data.len() {
            trace!(session = %self.id, dropped = data.len() - offset, "inbound bytes on closed session");
        }
    }

    /// Notify the session that the transport closed.
    ///
    /// Moves to `Closed` without closing the transport again and emits
    /// `Disconnect` once.
    pub fn on_transport_close(&mut self) {
        if self.state != SessionState::Closed {
            self.set_state(SessionState::Closed);
        }
        if !self.disconnect_emitted {
            self.disconnect_emitted = true;
            self.sink.emit(SessionEvent::Disconnect);
        }
    }

    /// Notify the session of a transport error.
    ///
    /// The error is surfaced as an `Error` event; the state is untouched.
    pub fn on_transport_error(&mut self, err: Error) {
        warn!(session = %self.id, error = %err, "transport error");
        self.sink.emit(SessionEvent::Error(err));
    }

    fn dispatch(&mut self, frame: Frame) {
        match handler_for::<T, S>(frame.kind) {
            Some(handler) => handler(self, frame.body),
            None => trace!(session = %self.id, kind = %frame.kind, "ignoring package"),
        }
    }

    fn handle_handshake(&mut self, body: Bytes) {
        match decode_utf8(&body) {
            Ok(text) => self.sink.emit(SessionEvent::Handshake(text)),
            Err(err) => self.decode_failed(err),
        }
    }

    fn handle_handshake_ack(&mut self, _body: Bytes) {
        if self.state != SessionState::WaitAck {
            trace!(session = %self.id, state = %self.state, "unexpected handshake ack");
            return;
        }
        self.set_state(SessionState::Working);
        self.sink.emit(SessionEvent::Heartbeat);
    }

    fn handle_heartbeat(&mut self, _body: Bytes) {
        self.sink.emit(SessionEvent::Heartbeat);
    }

    fn handle_data(&mut self, body: Bytes) {
        let decoded =
            message::decode(&body).and_then(|raw| Message::from_raw(raw, &self.config.routes));
        match decoded {
            Ok(msg) => self.sink.emit(SessionEvent::Message(msg)),
            Err(err) => self.decode_failed(err),
        }
    }

    fn decode_failed(&mut self, err: Error) {
        match self.config.decode_failure {
            DecodeFailurePolicy::Drop => {
                debug!(session = %self.id, error = %err, "dropping undecodable inbound data");
            }
            DecodeFailurePolicy::Disconnect => {
                warn!(session = %self.id, error = %err, "undecodable inbound data, disconnecting");
                self.sink.emit(SessionEvent::Error(err));
                self.disconnect();
            }
        }
    }

    fn package(&self, payload: Payload) -> crate::Result<Bytes> {
        let body = payload.into_bytes()?;
        self.config.limits.check_body_size(body.len())?;
        package::encode(PackageType::Data, &body)
    }

    fn set_state(&mut self, next: SessionState) {
        debug!(session = %self.id, from = %self.state, to = %next, "state changed");
        self.state = next;
    }
}
