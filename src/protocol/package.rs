//! Package framing: the outer envelope carried by the transport.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +---------------+-----------------------------------------------+
//! |     type      |              body length (24-bit BE)          |
//! +---------------+-----------------------------------------------+
//! |                         body ...                              |
//! +---------------------------------------------------------------+
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Size of the package header in bytes.
pub const HEADER_LEN: usize = 4;

/// Largest body the 24-bit length field can describe.
pub const MAX_BODY_SIZE: usize = 0x00FF_FFFF;

/// Package type tag.
///
/// Codes outside the known set decode to [`PackageType::Other`] so that
/// newer peers can send types this side does not understand yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// Client handshake request (0x1).
    Handshake,
    /// Client acknowledgement of the handshake response (0x2).
    HandshakeAck,
    /// Liveness signal (0x3).
    Heartbeat,
    /// Application data (0x4).
    Data,
    /// Server-initiated kick before disconnect (0x5).
    Kick,
    /// Any code without a known meaning.
    Other(u8),
}

impl PackageType {
    /// Create a package type from its wire code.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Self {
        match byte {
            0x1 => PackageType::Handshake,
            0x2 => PackageType::HandshakeAck,
            0x3 => PackageType::Heartbeat,
            0x4 => PackageType::Data,
            0x5 => PackageType::Kick,
            other => PackageType::Other(other),
        }
    }

    /// Wire code of this package type.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            PackageType::Handshake => 0x1,
            PackageType::HandshakeAck => 0x2,
            PackageType::Heartbeat => 0x3,
            PackageType::Data => 0x4,
            PackageType::Kick => 0x5,
            PackageType::Other(code) => code,
        }
    }

    /// Get human-readable name for this package type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PackageType::Handshake => "Handshake",
            PackageType::HandshakeAck => "HandshakeAck",
            PackageType::Heartbeat => "Heartbeat",
            PackageType::Data => "Data",
            PackageType::Kick => "Kick",
            PackageType::Other(_) => "Other",
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageType::Other(code) => write!(f, "Other({code:#x})"),
            known => write!(f, "{}", known.name()),
        }
    }
}

/// Read the body length from a complete header.
#[inline]
pub(crate) fn body_len(header: &[u8]) -> usize {
    ((header[1] as usize) << 16) | ((header[2] as usize) << 8) | header[3] as usize
}

/// A decoded package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Package type tag.
    pub kind: PackageType,
    /// Opaque body bytes.
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    #[must_use]
    pub fn new(kind: PackageType, body: impl Into<Bytes>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    /// Parse one package from the front of `buf`.
    ///
    /// Returns the frame and the number of bytes consumed.
    ///
    /// ## Errors
    ///
    /// - `Error::IncompletePackage` if `buf` ends before the package does
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_LEN {
            return Err(Error::IncompletePackage {
                needed: HEADER_LEN - buf.len(),
            });
        }

        let len = body_len(buf);
        let total = HEADER_LEN + len;
        if buf.len() < total {
            return Err(Error::IncompletePackage {
                needed: total - buf.len(),
            });
        }

        let frame = Frame {
            kind: PackageType::from_u8(buf[0]),
            body: Bytes::copy_from_slice(&buf[HEADER_LEN..total]),
        };
        Ok((frame, total))
    }

    /// Decode a buffer holding exactly one package.
    ///
    /// ## Errors
    ///
    /// - `Error::IncompletePackage` if the buffer is short
    /// - `Error::InvalidPackage` if bytes remain after the package
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (frame, consumed) = Self::parse(buf)?;
        if consumed != buf.len() {
            return Err(Error::InvalidPackage(format!(
                "{} trailing bytes after package",
                buf.len() - consumed
            )));
        }
        Ok(frame)
    }

    /// Serialize this frame.
    ///
    /// ## Errors
    ///
    /// - `Error::BodyTooLarge` if the body does not fit the length field
    pub fn encode(&self) -> Result<Bytes> {
        encode(self.kind, &self.body)
    }

    /// Total encoded size of this frame.
    #[inline]
    #[must_use]
    pub fn wire_size(&self) -> usize {
        HEADER_LEN + self.body.len()
    }
}

/// Decode every package in `buf`.
///
/// ## Errors
///
/// - `Error::IncompletePackage` if the last package is truncated
pub fn decode_all(buf: &[u8]) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (frame, consumed) = Frame::parse(&buf[offset..])?;
        frames.push(frame);
        offset += consumed;
    }
    Ok(frames)
}

/// Encode a package of the given type around `body`.
///
/// ## Errors
///
/// - `Error::BodyTooLarge` if `body` exceeds [`MAX_BODY_SIZE`]
pub fn encode(kind: PackageType, body: &[u8]) -> Result<Bytes> {
    if body.len() > MAX_BODY_SIZE {
        return Err(Error::BodyTooLarge {
            size: body.len(),
            max: MAX_BODY_SIZE,
        });
    }

    let len = body.len();
    let mut buf = BytesMut::with_capacity(HEADER_LEN + len);
    buf.put_u8(kind.as_u8());
    buf.put_u8((len >> 16) as u8);
    buf.put_u8((len >> 8) as u8);
    buf.put_u8(len as u8);
    buf.put_slice(body);
    Ok(buf.freeze())
}
