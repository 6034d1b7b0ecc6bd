use classwire_session::{DecodeError, EncodeError};

/// Errors raised while moving entity batches over a stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The batch header contains an invalid magic number.
    #[error("invalid batch magic (expected 0x4357 \"CW\")")]
    InvalidMagic,

    /// The batch payload exceeds the configured maximum size.
    #[error("batch too large ({size} bytes, max {max})")]
    BatchTooLarge { size: usize, max: usize },

    /// The stream ended inside a batch.
    #[error("stream ended mid-batch ({buffered} bytes buffered)")]
    Truncated { buffered: usize },

    /// The sink accepted no more bytes.
    #[error("stream closed while writing")]
    Closed,

    /// An I/O error occurred while reading or writing batches.
    #[error("batch I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, StreamError>;
