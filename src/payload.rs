//! Outbound application payloads.

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;

/// An application payload handed to [`Session::send`](crate::Session::send).
///
/// The variant decides how the payload becomes package body bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw bytes, sent as-is.
    Bytes(Bytes),
    /// Text, sent as its UTF-8 bytes.
    Text(String),
    /// Structured value, sent as JSON text.
    Json(serde_json::Value),
}

impl Payload {
    /// Create a payload from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Coerce the payload into body bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if a JSON value fails to serialize.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Text(text) => Ok(Bytes::from(text)),
            Payload::Json(value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}
