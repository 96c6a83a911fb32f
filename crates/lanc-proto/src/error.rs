/// Errors raised while encoding or decoding LAN C messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// Protobuf decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The sensor id is not in the sensor table.
    #[error("unknown sensor id {0}")]
    UnknownSensor(u32),

    /// The command name is not in the command table.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A discovery reply was missing a required field.
    #[error("invalid discovery response: {0}")]
    InvalidDiscovery(String),

    /// A frame-level value (UUID) was malformed.
    #[error(transparent)]
    Frame(#[from] lanc_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
