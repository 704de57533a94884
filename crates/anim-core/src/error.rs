//! Error types for anim-core operations.
//!
//! Every failure in decode (compositing) and encode (frame submission,
//! container assembly) is fatal to the current operation. Animations are
//! all-or-nothing artifacts, so there is no skip-and-continue path and no
//! internal retry.
//!
//! # Usage
//!
//! ```rust
//! use anim_core::{Error, Result};
//!
//! fn frame_index(index: usize, count: usize) -> Result<usize> {
//!     if index >= count {
//!         return Err(Error::index_out_of_range(index, count));
//!     }
//!     Ok(index)
//! }
//!
//! assert!(frame_index(3, 2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while compositing, storing, or encoding animations.
///
/// # Categories
///
/// - **Decode**: [`SourceRead`](Error::SourceRead), [`CanvasTooLarge`](Error::CanvasTooLarge)
/// - **Access**: [`IndexOutOfRange`](Error::IndexOutOfRange), [`OutOfBounds`](Error::OutOfBounds)
/// - **Encode**: [`EncodeSubmission`](Error::EncodeSubmission), [`EncodeAssembly`](Error::EncodeAssembly)
/// - **Control**: [`Cancelled`](Error::Cancelled)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The patch source could not produce the next patch.
    ///
    /// Decode aborts immediately; no partial animation is returned.
    #[error("patch source read failure: {0}")]
    SourceRead(String),

    /// `width * height * 4` does not fit in addressable memory.
    ///
    /// Detected before any buffer is allocated.
    #[error("canvas {width}x{height} is too large to allocate")]
    CanvasTooLarge {
        /// Requested canvas width
        width: u32,
        /// Requested canvas height
        height: u32,
    },

    /// Frame index outside `[0, count)`.
    #[error("frame index {index} out of range for {count} frames")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of frames available
        count: usize,
    },

    /// Pixel coordinates outside the canvas.
    #[error("pixel ({x}, {y}) out of bounds for canvas {width}x{height}")]
    OutOfBounds {
        /// X coordinate
        x: u32,
        /// Y coordinate
        y: u32,
        /// Canvas width
        width: u32,
        /// Canvas height
        height: u32,
    },

    /// Buffer length or frame size does not match the declared dimensions.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// What did not match
        reason: String,
    },

    /// A single frame failed to compress.
    #[error("failed to encode frame {frame}: {reason}")]
    EncodeSubmission {
        /// Index of the rejected frame
        frame: usize,
        /// Encoder message
        reason: String,
    },

    /// Final container assembly failed.
    #[error("failed to assemble animation: {0}")]
    EncodeAssembly(String),

    /// The progress sink asked the operation to stop.
    #[error("operation cancelled at {percent}%")]
    Cancelled {
        /// Last reported percentage
        percent: u32,
    },
}

impl Error {
    /// Creates an [`Error::SourceRead`] error.
    #[inline]
    pub fn source_read(msg: impl Into<String>) -> Self {
        Self::SourceRead(msg.into())
    }

    /// Creates an [`Error::IndexOutOfRange`] error.
    #[inline]
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::EncodeSubmission`] error.
    #[inline]
    pub fn encode_submission(frame: usize, reason: impl Into<String>) -> Self {
        Self::EncodeSubmission {
            frame,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::EncodeAssembly`] error.
    #[inline]
    pub fn encode_assembly(reason: impl Into<String>) -> Self {
        Self::EncodeAssembly(reason.into())
    }

    /// Returns `true` for index and pixel bounds errors.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::OutOfBounds { .. })
    }

    /// Returns `true` if the encoder side failed.
    #[inline]
    pub fn is_encode_error(&self) -> bool {
        matches!(self, Self::EncodeSubmission { .. } | Self::EncodeAssembly(_))
    }

    /// Returns `true` if a progress sink stopped the operation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
