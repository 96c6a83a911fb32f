use std::path::PathBuf;
use std::time::Duration;

use lanc_frame::DeviceUuid;

use crate::state::SessionState;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] lanc_transport::TransportError),

    /// Encoding error, unknown sensor or unknown command.
    #[error(transparent)]
    Proto(#[from] lanc_proto::ProtoError),

    /// No device address/UUID yet; run discovery first.
    #[error("device not discovered")]
    NotDiscovered,

    /// Discovery found a different device than the one this session talks to.
    #[error("device changed from {expected} to {found}")]
    DeviceChanged {
        expected: DeviceUuid,
        found: DeviceUuid,
    },

    /// The device did not confirm the session.
    #[error("session not active (state: {0})")]
    NotActive(SessionState),

    /// Timed out waiting for the device.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The settings file could not be read.
    #[error("failed to read settings {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
