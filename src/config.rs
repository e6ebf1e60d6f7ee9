//! Configuration and limits for sessions.

use crate::protocol::{MAX_BODY_SIZE, RouteDictionary};

/// Configuration limits for sessions.
///
/// These limits bound the memory a single peer can make the reader buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a package body in bytes, inbound and outbound.
    ///
    /// Values above the 24-bit length field are clamped to it.
    ///
    /// Default: 16 MB - 1 (0xFF_FFFF)
    pub max_body_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_size: MAX_BODY_SIZE,
        }
    }
}

impl Limits {
    /// Create new limits with a custom body size.
    #[must_use]
    pub const fn new(max_body_size: usize) -> Self {
        let max_body_size = if max_body_size > MAX_BODY_SIZE {
            MAX_BODY_SIZE
        } else {
            max_body_size
        };
        Self { max_body_size }
    }

    /// Create limits suitable for small embedded systems.
    ///
    /// - Max body: 64 KB
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }

    /// Validate that a body size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyTooLarge`](crate::Error::BodyTooLarge) if `size` exceeds the configured maximum.
    pub const fn check_body_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_body_size {
            Err(crate::Error::BodyTooLarge {
                size,
                max: self.max_body_size,
            })
        } else {
            Ok(())
        }
    }
}

/// What a session does with inbound bytes it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodeFailurePolicy {
    /// Drop the buffer silently.
    #[default]
    Drop,
    /// Emit an `Error` event, then disconnect the session.
    Disconnect,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Handling of malformed inbound packages and messages.
    ///
    /// Default: [`DecodeFailurePolicy::Drop`]
    pub decode_failure: DecodeFailurePolicy,

    /// Dictionary resolving compressed route codes.
    ///
    /// Default: empty
    pub routes: RouteDictionary,

    /// Read buffer size used by the driver (in bytes).
    ///
    /// Default: 8 KB (8192)
    pub read_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            decode_failure: DecodeFailurePolicy::default(),
            routes: RouteDictionary::default(),
            read_buffer_size: 8192,
        }
    }
}

impl Config {
    /// Create a new configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the decode failure policy.
    #[must_use]
    pub const fn with_decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    /// Set the route dictionary for compressed routes.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteDictionary) -> Self {
        self.routes = routes;
        self
    }

    /// Set read buffer size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Configuration that disconnects peers sending malformed data.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            decode_failure: DecodeFailurePolicy::Disconnect,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_default() {
        let limits = Limits::default();
        assert_eq!(limits.max_body_size, 0xFF_FFFF);
    }

    #[test]
    fn test_limits_embedded() {
        assert_eq!(Limits::embedded().max_body_size, 64 * 1024);
    }

    #[test]
    fn test_limits_new_clamps_to_length_field() {
        assert_eq!(Limits::new(usize::MAX).max_body_size, MAX_BODY_SIZE);
        assert_eq!(Limits::new(10).max_body_size, 10);
    }

    #[test]
    fn test_limits_check_body_size() {
        let limits = Limits::new(1024);
        assert!(limits.check_body_size(1024).is_ok());
        assert!(matches!(
            limits.check_body_size(1025),
            Err(crate::Error::BodyTooLarge {
                size: 1025,
                max: 1024
            })
        ));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Drop);
        assert!(config.routes.is_empty());
        assert_eq!(config.read_buffer_size, 8192);
    }

    #[test]
    fn test_config_strict() {
        let config = Config::strict();
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Disconnect);
    }

    #[test]
    fn test_config_builder() {
        let routes: RouteDictionary = [(1, "chat.say")].into_iter().collect();
        let config = Config::new()
            .with_limits(Limits::embedded())
            .with_decode_failure(DecodeFailurePolicy::Disconnect)
            .with_routes(routes)
            .with_read_buffer_size(1024);

        assert_eq!(config.limits.max_body_size, 64 * 1024);
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Disconnect);
        assert_eq!(config.routes.get(1), Some("chat.say"));
        assert_eq!(config.read_buffer_size, 1024);
    }
}
