use std::fmt;
use std::time::SystemTime;

use lanc_proto::DecodedMessage;

/// Why the session ended without being closed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The device handed the session to another client.
    OtherSession,
    /// The TCP connection dropped.
    ConnectionLost,
}

impl DisconnectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OtherSession => "OTHER_SESSION",
            Self::ConnectionLost => "CONNECTION_LOST",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded frame with its capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub message: DecodedMessage,
    pub received_at: SystemTime,
}

/// Events published on the session's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Every inbound frame, whether or not a request was waiting for it.
    Message(InboundMessage),
    Disconnected(DisconnectReason),
    /// Transport failure, reported before the matching disconnect.
    Error(String),
}
