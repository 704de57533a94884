//! Full-canvas RGBA8 buffers and composited frames.
//!
//! A [`Canvas`] owns exactly `width * height * 4` bytes. Every offset
//! computation goes through [`Canvas::offset`], so bounds are checked in
//! one place instead of at each call site.

use crate::error::{Error, Result};
use crate::pixel::{Rgba8, BYTES_PER_PIXEL};
use crate::rect::Rect;

/// Returns the byte length of a `width x height` RGBA8 buffer.
///
/// Fails with [`Error::CanvasTooLarge`] if the size overflows or exceeds
/// the largest allocation Rust allows (`isize::MAX`).
pub fn byte_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or(Error::CanvasTooLarge { width, height })
}

/// A full-canvas RGBA8 pixel buffer (straight alpha).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Creates a fully transparent canvas.
    ///
    /// The size is validated before anything is allocated.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Wraps an existing RGBA8 buffer.
    ///
    /// Fails with [`Error::InvalidDimensions`] if `data` is not exactly
    /// `width * height * 4` bytes long.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", len, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a canvas filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Result<Self> {
        let len = byte_len(width, height)?;
        let px = color.to_array();
        let data = px.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Canvas width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Raw RGBA8 bytes, row-major.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA8 bytes, row-major.
    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the canvas, returning the raw buffer.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of pixel (x, y), bounds-checked.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Returns the pixel at (x, y).
    pub fn pixel_at(&self, x: u32, y: u32) -> Result<Rgba8> {
        let i = self.offset(x, y)?;
        Ok(Rgba8::from_slice(&self.data[i..i + BYTES_PER_PIXEL]))
    }

    /// Overwrites the pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba8) -> Result<()> {
        let i = self.offset(x, y)?;
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&px.to_array());
        Ok(())
    }

    /// Resets every pixel inside `rect` to transparent black.
    ///
    /// `rect` is intersected with the canvas first; parts outside are ignored.
    pub fn clear_rect(&mut self, rect: Rect) {
        let Some(r) = rect.intersect(&Rect::from_size(self.width, self.height)) else {
            return;
        };
        let stride = self.stride();
        let x0 = r.x as usize * BYTES_PER_PIXEL;
        let x1 = r.right() as usize * BYTES_PER_PIXEL;
        for row in self
            .data
            .chunks_exact_mut(stride)
            .skip(r.y as usize)
            .take(r.height as usize)
        {
            row[x0..x1].fill(0);
        }
    }

    /// Returns `true` if every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .all(|px| px[3] == u8::MAX)
    }
}

/// One fully resolved animation frame plus its display time.
///
/// Each frame owns its buffer; no frame aliases another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Full-canvas pixels.
    pub canvas: Canvas,
    /// Display time in milliseconds.
    pub duration_ms: u32,
}

impl Frame {
    /// Creates a frame.
    #[inline]
    pub fn new(canvas: Canvas, duration_ms: u32) -> Self {
        Self {
            canvas,
            duration_ms,
        }
    }

    /// Raw RGBA8 bytes of the frame.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.canvas.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let c = Canvas::new(3, 2).unwrap();
        assert_eq!(c.as_bytes().len(), 3 * 2 * 4);
        assert!(c.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_too_large() {
        let err = Canvas::new(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, Error::CanvasTooLarge { .. }));
        assert!(byte_len(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn test_from_raw_checks_len() {
        assert!(Canvas::from_raw(2, 2, vec![0; 16]).is_ok());
        let err = Canvas::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_pixel_access() {
        let mut c = Canvas::new(4, 4).unwrap();
        let px = Rgba8::new(1, 2, 3, 4);
        c.set_pixel(3, 2, px).unwrap();
        assert_eq!(c.pixel_at(3, 2).unwrap(), px);
        assert_eq!(&c.as_bytes()[(2 * 4 + 3) * 4..(2 * 4 + 3) * 4 + 4], &[1, 2, 3, 4]);
        assert!(c.pixel_at(4, 0).unwrap_err().is_bounds_error());
        assert!(c.set_pixel(0, 4, px).is_err());
    }

    #[test]
    fn test_clear_rect_far_offset() {
        let red = Rgba8::new(255, 0, 0, 255);
        let mut c = Canvas::filled(2, 2, red).unwrap();
        c.clear_rect(Rect::new(u32::MAX, 0, 2, 2));
        assert_eq!(c, Canvas::filled(2, 2, red).unwrap());
    }

    #[test]
    fn test_clear_rect_clips() {
        let red = Rgba8::new(255, 0, 0, 255);
        let mut c = Canvas::filled(4, 4, red).unwrap();
        c.clear_rect(Rect::new(2, 2, 10, 10));
        assert_eq!(c.pixel_at(1, 1).unwrap(), red);
        assert_eq!(c.pixel_at(2, 2).unwrap(), Rgba8::TRANSPARENT);
        assert_eq!(c.pixel_at(3, 3).unwrap(), Rgba8::TRANSPARENT);
        assert_eq!(c.pixel_at(1, 3).unwrap(), red);
    }

    #[test]
    fn test_is_opaque() {
        assert!(Canvas::filled(2, 2, Rgba8::new(0, 0, 0, 255)).unwrap().is_opaque());
        assert!(!Canvas::new(2, 2).unwrap().is_opaque());
    }
}
