//! Read-only storage for a decoded animation.
//!
//! A [`FrameStore`] is the terminal artifact of decode and the only input
//! to encode. Every frame has the store's canvas size, which is checked
//! once at construction; there is no mutation API afterwards.

use crate::canvas::Frame;
use crate::error::{Error, Result};
use crate::timing;

/// Decoded animation: ordered full frames plus shared metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStore {
    width: u32,
    height: u32,
    frames: Vec<Frame>,
    rate: f64,
    loop_count: u16,
}

impl FrameStore {
    /// Builds a store from frames in display order.
    ///
    /// Fails with [`Error::InvalidDimensions`] if any frame's canvas is not
    /// `width x height`.
    pub fn new(width: u32, height: u32, frames: Vec<Frame>) -> Result<Self> {
        for (i, frame) in frames.iter().enumerate() {
            if frame.canvas.dimensions() != (width, height) {
                return Err(Error::invalid_dimensions(
                    width,
                    height,
                    format!(
                        "frame {} is {}x{}",
                        i,
                        frame.canvas.width(),
                        frame.canvas.height()
                    ),
                ));
            }
        }
        let rate = timing::derive_rate(&frames);
        Ok(Self {
            width,
            height,
            frames,
            rate,
            loop_count: 0,
        })
    }

    /// Sets the container loop count (0 = loop forever).
    #[must_use]
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Canvas width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the store holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Derived playback rate in frames per second; `0.0` means unknown.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Container loop count (0 = loop forever).
    #[inline]
    pub fn loop_count(&self) -> u16 {
        self.loop_count
    }

    /// Frame at `index`.
    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.frames.len()))
    }

    /// RGBA8 bytes of frame `index`.
    pub fn pixels(&self, index: usize) -> Result<&[u8]> {
        self.frame(index).map(Frame::pixels)
    }

    /// Iterates frames in display order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &Frame> + '_ {
        self.frames.iter()
    }

    /// Iterates frame durations in milliseconds.
    pub fn durations(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.frames.iter().map(|f| f.duration_ms)
    }

    /// Sum of all frame durations in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        timing::total_duration_ms(&self.frames)
    }

    /// Consumes the store, returning its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
