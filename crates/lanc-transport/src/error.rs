use std::net::SocketAddr;
use std::time::Duration;

use lanc_frame::FrameError;
use lanc_proto::ProtoError;

/// Errors raised by the TCP transport and the discovery exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the device.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to bind the discovery listener.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An operation did not complete in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// No traffic in either direction within the idle window.
    #[error("connection idle for {0:?}")]
    IdleTimeout(Duration),

    /// A send was attempted while not connected.
    #[error("not connected")]
    NotConnected,

    /// An I/O error occurred on a socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The inbound stream carried a malformed frame.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The discovery reply could not be decoded.
    #[error("discovery failed: {0}")]
    Discovery(#[from] ProtoError),
}

pub type Result<T> = std::result::Result<T, TransportError>;
