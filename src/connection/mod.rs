//! Session management and the handshake state machine.
//!
//! This module provides the core [`Session`] type, its state machine and,
//! with the `async-tokio` feature, a driver running each session in its own
//! task.
//!
//! ## Session Lifecycle
//!
//! 1. **Init** - Peer connected, handshake request expected
//! 2. **WaitAck** - Handshake response sent, acknowledgement expected
//! 3. **Working** - Application data flows both ways
//! 4. **Closed** - Terminal; reached from any state
//!
//! ## Example
//!
//! ```rust,ignore
//! use hybridsock::{Config, SessionEvent, connection};
//!
//! let (stream, _) = listener.accept().await?;
//! let (handle, mut events) = connection::spawn_tcp(1u64, stream, Config::default())?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::Handshake(_) => handle.respond_handshake(response.clone())?,
//!         SessionEvent::Message(msg) => println!("{}: {}", msg.route, msg.body),
//!         SessionEvent::Disconnect => break,
//!         _ => {}
//!     }
//! }
//! ```

mod id;
mod session;
mod state;

pub use id::SessionId;
pub use session::Session;
pub use state::SessionState;

#[cfg(feature = "async-tokio")]
mod driver;

#[cfg(feature = "async-tokio")]
pub use driver::{SessionHandle, spawn, spawn_tcp};
