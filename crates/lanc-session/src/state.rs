use std::fmt;

/// Client-side view of the device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Device address and identity unknown.
    #[default]
    NotDiscovered,
    /// Device known, no session held.
    Discovered,
    /// StartSession sent, waiting for the confirmation.
    SessionRequested,
    SessionActive,
    /// Another client took the session over.
    OtherSessionLost,
    /// Closed on request; no reconnection.
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotDiscovered => "not-discovered",
            Self::Discovered => "discovered",
            Self::SessionRequested => "session-requested",
            Self::SessionActive => "session-active",
            Self::OtherSessionLost => "other-session-lost",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
