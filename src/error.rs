//! Error types for the session adapter.
//!
//! This module defines every error condition that can surface from package
//! decoding, message decoding, payload coercion and the transport.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while framing, decoding or transporting packages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed package header or body.
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// Incomplete package data.
    #[error("Incomplete package: need {needed} more bytes")]
    IncompletePackage {
        /// Number of additional bytes needed.
        needed: usize,
    },

    /// Package body exceeds the 24-bit length field or the configured limit.
    #[error("Package body too large: {size} bytes (max: {max})")]
    BodyTooLarge {
        /// Actual body size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Malformed inner message in a data package.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Route or body text is not valid UTF-8.
    #[error("Invalid UTF-8 in message text")]
    InvalidUtf8,

    /// Uncompressed route does not fit the one-byte length prefix.
    #[error("Route too long: {0} bytes (max: 255)")]
    RouteTooLong(usize),

    /// Compressed route code missing from the route dictionary.
    #[error("Unknown route code: {0}")]
    UnknownRouteCode(u16),

    /// Structured payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The session is closed.
    #[error("Session closed")]
    SessionClosed,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
