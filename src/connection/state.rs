//! Session state machine.

/// Session state.
///
/// ```text
/// Init --respond_handshake--> WaitAck --HandshakeAck--> Working
///   \                            |                        /
///    `--------------------> Closed <----------------------'
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Waiting for the application to answer the peer's handshake.
    #[default]
    Init,
    /// Handshake response sent, waiting for the peer's acknowledgement.
    WaitAck,
    /// Handshake complete, application data may flow.
    Working,
    /// Terminal state.
    Closed,
}

impl SessionState {
    /// Check if the session has not been closed.
    #[must_use]
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, SessionState::Closed)
    }

    /// Check if application payloads may be sent in this state.
    ///
    /// Returns `true` only for `Working`.
    #[must_use]
    #[inline]
    pub const fn can_send(&self) -> bool {
        matches!(self, SessionState::Working)
    }

    /// Check if pre-framed bytes may be forced out in this state.
    ///
    /// Returns `true` for every state except `Closed`.
    #[must_use]
    #[inline]
    pub const fn can_force_send(&self) -> bool {
        self.is_active()
    }

    /// Check if a handshake response may be sent in this state.
    #[must_use]
    #[inline]
    pub const fn can_respond_handshake(&self) -> bool {
        matches!(self, SessionState::Init)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Init => write!(f, "Init"),
            SessionState::WaitAck => write!(f, "WaitAck"),
            SessionState::Working => write!(f, "Working"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}
