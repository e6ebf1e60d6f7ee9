//! # hybridsock - Handshake-gated sessions over message-framed sockets
//!
//! `hybridsock` wraps one bidirectional, message-framed transport in a
//! [`Session`]: a small state machine that turns inbound packages into typed
//! [`SessionEvent`]s and refuses to send application data before the
//! handshake has completed.
//!
//! ## Features
//!
//! - **Handshake gating**: `Init → WaitAck → Working`, with `Closed` reachable from anywhere
//! - **Typed events** delivered to any [`EventSink`] (a `Vec`, a tokio channel, ...)
//! - **Package and message codecs** for the type + 24-bit length wire format
//! - **Task-per-session driver** for tokio streams
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hybridsock::{Config, Session, SessionEvent};
//!
//! let mut events: Vec<SessionEvent> = Vec::new();
//! let mut session = Session::with_config("s1", transport, &mut events, Config::default());
//!
//! session.on_bytes(&inbound);
//! session.respond_handshake(response);
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod payload;
pub mod protocol;
pub mod transport;

pub use config::{Config, DecodeFailurePolicy, Limits};
pub use connection::{Session, SessionId, SessionState};
#[cfg(feature = "async-tokio")]
pub use connection::{SessionHandle, spawn, spawn_tcp};
pub use error::{Error, Result};
pub use event::{EventSink, SessionEvent};
pub use payload::Payload;
pub use protocol::{Frame, Message, MessageType, PackageType, RouteDictionary};
#[cfg(feature = "async-tokio")]
pub use transport::ChannelTransport;
pub use transport::{RemoteAddress, Transport};
