//! Error types for container and file operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// Compositing or encoding failed inside anim-core.
    #[error(transparent)]
    Core(#[from] anim_core::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Per-frame bitstream could not be decoded.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Per-frame bitstream could not be encoded, or the container could
    /// not be assembled.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Malformed container structure.
    #[error("format error: {0}")]
    Format(String),
}

impl IoError {
    /// Creates a [`IoError::Format`] error.
    #[inline]
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err = IoError::from(anim_core::Error::index_out_of_range(4, 2));
        assert_eq!(err.to_string(), "frame index 4 out of range for 2 frames");
    }

    #[test]
    fn test_format_display() {
        assert_eq!(IoError::format("short chunk").to_string(), "format error: short chunk");
    }
}
