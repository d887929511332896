//! Error types for the mesh stream codec.

use thiserror::Error;

/// Main error type for encode and decode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller broke a session precondition (never retried).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Stream is malformed and cannot be decoded
    #[error("Malformed stream: {0}")]
    Format(String),

    /// Stream ended before a field could be read
    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Stream was produced by an incompatible major version
    #[error("Unsupported stream version: {0}")]
    UnsupportedVersion(u8),

    /// An attribute encode or decode job reported failure
    #[error("Attribute job {index} failed")]
    JobFailed { index: usize },

    /// Worker pool could not be created or misbehaved
    #[error("Job pool unavailable: {0}")]
    Resource(String),

    /// I/O error from byte-level writes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// True for errors caused by the input stream rather than the caller.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Format(_) | Self::UnexpectedEof { .. } | Self::UnsupportedVersion(_)
        )
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
