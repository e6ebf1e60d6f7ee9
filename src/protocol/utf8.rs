//! UTF-8 decoding of handshake and message text.

use crate::error::{Error, Result};

/// Decode bytes as a UTF-8 string.
///
/// # Errors
///
/// Returns `Error::InvalidUtf8` if the data contains invalid UTF-8 sequences.
#[inline]
pub fn decode_utf8(data: &[u8]) -> Result<String> {
    std::str::from_utf8(data)
        .map(str::to_owned)
        .map_err(|_| Error::InvalidUtf8)
}
