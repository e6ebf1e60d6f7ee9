//! Property-based tests for package decoding and the session state machine.
//!
//! These tests use proptest to drive arbitrary input and operation sequences
//! through the codec and the session.

mod harness;

use bytes::Bytes;
use harness::{RecordingTransport, notify, package};
use hybridsock::protocol::{decode_all, message};
use hybridsock::{Config, Frame, PackageType, Session, SessionEvent, SessionState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Send,
    SendForce,
    RespondHandshake,
    Disconnect,
    Handshake,
    HandshakeAck,
    Heartbeat,
    Data,
    TransportClose,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Send),
        Just(Op::SendForce),
        Just(Op::RespondHandshake),
        Just(Op::Disconnect),
        Just(Op::Handshake),
        Just(Op::HandshakeAck),
        Just(Op::Heartbeat),
        Just(Op::Data),
        Just(Op::TransportClose),
    ]
}

fn state_rank(state: SessionState) -> u8 {
    match state {
        SessionState::Init => 0,
        SessionState::WaitAck => 1,
        SessionState::Working => 2,
        SessionState::Closed => 3,
    }
}

proptest! {
    // =========================================================================
    // Property 1: decoding never panics on arbitrary bytes
    // =========================================================================
    #[test]
    fn test_decode_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = Frame::parse(&data);
        let _ = decode_all(&data);
        let _ = message::decode(&data);
    }

    // =========================================================================
    // Property 2: sessions never panic on arbitrary inbound bytes
    // =========================================================================
    #[test]
    fn test_session_arbitrary_inbound(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16),
        strict in any::<bool>(),
    ) {
        let config = if strict { Config::strict() } else { Config::default() };
        let mut session = Session::with_config("p", RecordingTransport::new(), Vec::new(), config);
        for chunk in &chunks {
            session.on_bytes(chunk);
        }
        prop_assert!(session.transport().closes <= 1);
    }

    // =========================================================================
    // Property 3: encoded packages parse back with the same type and body
    // =========================================================================
    #[test]
    fn test_package_parse_matches_encode(
        code in 1u8..=255,
        body in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let kind = PackageType::from_u8(code);
        let encoded = package(kind, &body);
        let (frame, consumed) = Frame::parse(&encoded).unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(frame.kind, kind);
        prop_assert_eq!(&frame.body[..], &body[..]);
    }

    // =========================================================================
    // Property 4: state machine invariants under random operation sequences
    // =========================================================================
    #[test]
    fn test_state_machine_invariants(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut session = Session::new("p", RecordingTransport::new(), Vec::new());
        let mut handshake_responses = 0;

        for op in ops {
            let before = session.state();
            let writes_before = session.transport().written.len();
            let events_before = session.sink().len();

            match op {
                Op::Send => {
                    let sent = session.send("x");
                    prop_assert_eq!(sent, before == SessionState::Working);
                }
                Op::SendForce => {
                    let sent = session.send_force(Bytes::from_static(b"raw"));
                    prop_assert_eq!(sent, before != SessionState::Closed);
                }
                Op::RespondHandshake => {
                    if session.respond_handshake(Bytes::from_static(b"resp")) {
                        handshake_responses += 1;
                        prop_assert_eq!(session.state(), SessionState::WaitAck);
                    }
                }
                Op::Disconnect => {
                    session.disconnect();
                    prop_assert_eq!(session.state(), SessionState::Closed);
                }
                Op::Handshake => session.on_bytes(&package(PackageType::Handshake, b"{}")),
                Op::HandshakeAck => {
                    session.on_bytes(&package(PackageType::HandshakeAck, b""));
                    if before == SessionState::WaitAck {
                        prop_assert_eq!(session.state(), SessionState::Working);
                        prop_assert_eq!(session.sink().len(), events_before + 1);
                        prop_assert_eq!(session.sink().last(), Some(&SessionEvent::Heartbeat));
                    } else {
                        prop_assert_eq!(session.state(), before);
                    }
                }
                Op::Heartbeat => session.on_bytes(&package(PackageType::Heartbeat, b"")),
                Op::Data => session.on_bytes(&notify("r", "b")),
                Op::TransportClose => session.on_transport_close(),
            }

            let after = session.state();
            // only ever moves forward, and Closed is terminal
            prop_assert!(state_rank(after) >= state_rank(before));
            if before == SessionState::Closed {
                prop_assert_eq!(session.transport().written.len(), writes_before);
            }
            prop_assert!(session.transport().closes <= 1);
        }

        prop_assert!(handshake_responses <= 1);
    }
}
