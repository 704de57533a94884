//! Decoded sub-images and the patch source contract.
//!
//! A [`Patch`] is one frame's drawing instruction as it comes out of a
//! container demultiplexer: a positioned RGBA8 rectangle plus blend and
//! dispose policy. Patches are consumed once by the compositor and then
//! dropped.

use std::fmt;

use crate::canvas::byte_len;
use crate::error::{Error, Result};
use crate::pixel::Rgba8;
use crate::rect::Rect;

/// How a patch combines with the canvas content beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMethod {
    /// Overwrite destination pixels verbatim.
    #[default]
    None,
    /// Source-over alpha compositing.
    AlphaBlend,
}

/// What happens to a patch's rectangle before the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisposeMethod {
    /// Keep the drawn pixels.
    #[default]
    None,
    /// Clear the patch rectangle to transparent black.
    Background,
}

/// One decoded, positioned sub-image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Left edge on the canvas (may be negative).
    pub x_offset: i32,
    /// Top edge on the canvas (may be negative).
    pub y_offset: i32,
    width: u32,
    height: u32,
    data: Vec<u8>,
    /// Blend policy.
    pub blend: BlendMethod,
    /// Dispose policy.
    pub dispose: DisposeMethod,
    /// Display time of the frame this patch produces, in milliseconds.
    pub duration_ms: u32,
}

impl Patch {
    /// Creates a patch at `(x_offset, y_offset)` with default policies
    /// (no blend, no dispose) and zero duration.
    ///
    /// Fails with [`Error::InvalidDimensions`] if `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn new(x_offset: i32, y_offset: i32, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("patch buffer has {} bytes, expected {}", data.len(), len),
            ));
        }
        Ok(Self {
            x_offset,
            y_offset,
            width,
            height,
            data,
            blend: BlendMethod::None,
            dispose: DisposeMethod::None,
            duration_ms: 0,
        })
    }

    /// Creates a patch filled with a single color.
    pub fn solid(x_offset: i32, y_offset: i32, width: u32, height: u32, color: Rgba8) -> Result<Self> {
        let len = byte_len(width, height)?;
        let data = color.to_array().iter().copied().cycle().take(len).collect();
        Self::new(x_offset, y_offset, width, height, data)
    }

    /// Sets the blend method.
    #[must_use]
    pub fn with_blend(mut self, blend: BlendMethod) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the dispose method.
    #[must_use]
    pub fn with_dispose(mut self, dispose: DisposeMethod) -> Self {
        self.dispose = dispose;
        self
    }

    /// Sets the frame duration.
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Decoded width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Decoded height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes of the decoded rectangle.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The part of this patch that lands on a `canvas_w x canvas_h` canvas.
    #[inline]
    pub fn clipped_rect(&self, canvas_w: u32, canvas_h: u32) -> Option<Rect> {
        Rect::clip(
            i64::from(self.x_offset),
            i64::from(self.y_offset),
            self.width,
            self.height,
            canvas_w,
            canvas_h,
        )
    }
}

/// Ordered supplier of patches for one animation.
///
/// Implemented by container demultiplexers. `next_patch` returns
/// `Ok(None)` once the animation is exhausted; any error aborts decode
/// and surfaces as [`Error::SourceRead`].
pub trait PatchSource {
    /// Error produced while reading or decoding a patch.
    type Error: fmt::Display;

    /// Canvas `(width, height)` from container metadata.
    fn canvas_size(&self) -> (u32, u32);

    /// Number of frames declared by the container.
    fn frame_count(&self) -> usize;

    /// Yields the next patch, or `None` when there are no more frames.
    fn next_patch(&mut self) -> std::result::Result<Option<Patch>, Self::Error>;
}

/// A [`PatchSource`] over patches that are already in memory.
#[derive(Debug, Clone)]
pub struct VecSource {
    width: u32,
    height: u32,
    patches: std::vec::IntoIter<Patch>,
    count: usize,
}

impl VecSource {
    /// Creates a source yielding `patches` in order on a `width x height` canvas.
    pub fn new(width: u32, height: u32, patches: Vec<Patch>) -> Self {
        let count = patches.len();
        Self {
            width,
            height,
            patches: patches.into_iter(),
            count,
        }
    }
}

impl PatchSource for VecSource {
    type Error = std::convert::Infallible;

    fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_count(&self) -> usize {
        self.count
    }

    fn next_patch(&mut self) -> std::result::Result<Option<Patch>, Self::Error> {
        Ok(self.patches.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_len() {
        assert!(Patch::new(0, 0, 2, 2, vec![0; 16]).is_ok());
        assert!(Patch::new(0, 0, 2, 2, vec![0; 12]).is_err());
        assert!(Patch::new(0, 0, 0, 5, Vec::new()).is_ok());
    }

    #[test]
    fn test_builders() {
        let p = Patch::solid(1, 2, 1, 1, Rgba8::new(1, 2, 3, 4))
            .unwrap()
            .with_blend(BlendMethod::AlphaBlend)
            .with_dispose(DisposeMethod::Background)
            .with_duration(40);
        assert_eq!(p.data(), &[1, 2, 3, 4]);
        assert_eq!(p.blend, BlendMethod::AlphaBlend);
        assert_eq!(p.dispose, DisposeMethod::Background);
        assert_eq!(p.duration_ms, 40);
    }

    #[test]
    fn test_clipped_rect() {
        let p = Patch::solid(-1, 3, 3, 3, Rgba8::TRANSPARENT).unwrap();
        assert_eq!(p.clipped_rect(4, 4), Some(Rect::new(0, 3, 2, 1)));
    }

    #[test]
    fn test_vec_source() {
        let p = Patch::solid(0, 0, 1, 1, Rgba8::TRANSPARENT).unwrap();
        let mut src = VecSource::new(1, 1, vec![p.clone(), p]);
        assert_eq!(src.frame_count(), 2);
        assert_eq!(src.canvas_size(), (1, 1));
        assert!(src.next_patch().unwrap().is_some());
        assert!(src.next_patch().unwrap().is_some());
        assert!(src.next_patch().unwrap().is_none());
    }
}
