//! Shared helpers for session integration tests.
//!
//! Provides a recording transport for driving sessions synchronously and a
//! TCP test client that speaks the package protocol.

#![allow(dead_code)]

mod client;
mod transport;

pub use client::TestClient;
pub use transport::RecordingTransport;

use bytes::Bytes;
use hybridsock::PackageType;
use hybridsock::protocol::{MessageType, RawMessage, RawRoute, encode, message};

/// Encode a package of `kind` around `body`.
pub fn package(kind: PackageType, body: &[u8]) -> Vec<u8> {
    encode(kind, body).unwrap().to_vec()
}

/// Encode a `Data` package carrying a notify message.
pub fn notify(route: &str, body: &str) -> Vec<u8> {
    let raw = RawMessage {
        id: 0,
        kind: MessageType::Notify,
        route: RawRoute::Name(Bytes::copy_from_slice(route.as_bytes())),
        body: Bytes::copy_from_slice(body.as_bytes()),
    };
    package(PackageType::Data, &message::encode(&raw).unwrap())
}

/// Encode a `Data` package carrying a request message.
pub fn request(id: u32, route: &str, body: &str) -> Vec<u8> {
    let raw = RawMessage {
        id,
        kind: MessageType::Request,
        route: RawRoute::Name(Bytes::copy_from_slice(route.as_bytes())),
        body: Bytes::copy_from_slice(body.as_bytes()),
    };
    package(PackageType::Data, &message::encode(&raw).unwrap())
}
