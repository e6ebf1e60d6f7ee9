//! In-memory transport recording every write and close.

use bytes::Bytes;
use hybridsock::{RemoteAddress, Transport};

/// Transport that records instead of performing I/O.
#[derive(Debug)]
pub struct RecordingTransport {
    pub written: Vec<Bytes>,
    pub closes: usize,
    remote: RemoteAddress,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_remote(RemoteAddress::new("192.168.1.20".parse().unwrap(), 51234))
    }

    pub fn with_remote(remote: RemoteAddress) -> Self {
        Self {
            written: Vec::new(),
            closes: 0,
            remote,
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, data: Bytes) {
        self.written.push(data);
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn remote_address(&self) -> RemoteAddress {
        self.remote
    }
}
