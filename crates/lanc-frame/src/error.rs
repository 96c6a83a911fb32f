/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared total length cannot hold the UUID region and operation length.
    #[error("frame too short (declared {declared} bytes, minimum {min})")]
    FrameTooShort { declared: usize, min: usize },

    /// The declared total length exceeds the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The operation envelope does not fit in the 2-byte length field.
    #[error("operation envelope too large ({size} bytes, max {max})")]
    OperationTooLarge { size: usize, max: usize },

    /// The operation length field points past the end of the frame.
    #[error("operation length {operation} exceeds frame body of {body} bytes")]
    InvalidOperationLength { operation: usize, body: usize },

    /// A UUID was not exactly 16 bytes / 32 hex characters.
    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
