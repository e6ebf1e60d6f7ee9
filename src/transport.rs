//! Transport abstraction consumed by a session.
//!
//! A transport delivers whole packages in both directions. Writes are
//! fire-and-forget: failures come back later through
//! [`Session::on_transport_error`](crate::Session::on_transport_error) and
//! [`Session::on_transport_close`](crate::Session::on_transport_close).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bytes::Bytes;

/// Address of the remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteAddress {
    /// Peer IP address.
    pub ip: IpAddr,
    /// Peer port.
    pub port: u16,
}

impl RemoteAddress {
    /// Create a remote address.
    #[must_use]
    pub const fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Placeholder address for transports without a network peer.
    #[must_use]
    pub const fn unspecified() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }
}

impl From<SocketAddr> for RemoteAddress {
    fn from(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip(),
            port: addr.port(),
        }
    }
}

impl std::fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", SocketAddr::new(self.ip, self.port))
    }
}

/// Write side of a message-framed connection, exclusively owned by a session.
pub trait Transport {
    /// Queue one binary message for the peer.
    fn send(&mut self, data: Bytes);

    /// Close the connection.
    fn close(&mut self);

    /// Address of the peer.
    fn remote_address(&self) -> RemoteAddress;
}

#[cfg(feature = "async-tokio")]
pub use channel::{ChannelTransport, Outbound};

#[cfg(feature = "async-tokio")]
mod channel {
    use bytes::Bytes;
    use tokio::sync::mpsc::UnboundedSender;

    use super::{RemoteAddress, Transport};

    /// Instruction for the task that owns the socket's write half.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Outbound {
        /// Write these bytes.
        Data(Bytes),
        /// Shut the write half down.
        Close,
    }

    /// Transport that forwards writes to a writer task over a channel.
    #[derive(Debug, Clone)]
    pub struct ChannelTransport {
        tx: UnboundedSender<Outbound>,
        remote: RemoteAddress,
    }

    impl ChannelTransport {
        /// Create a transport feeding `tx`.
        #[must_use]
        pub fn new(tx: UnboundedSender<Outbound>, remote: RemoteAddress) -> Self {
            Self { tx, remote }
        }
    }

    impl Transport for ChannelTransport {
        fn send(&mut self, data: Bytes) {
            if self.tx.send(Outbound::Data(data)).is_err() {
                tracing::trace!(peer = %self.remote, "writer gone, dropping outbound bytes");
            }
        }

        fn close(&mut self) {
            let _ = self.tx.send(Outbound::Close);
        }

        fn remote_address(&self) -> RemoteAddress {
            self.remote
        }
    }
}
