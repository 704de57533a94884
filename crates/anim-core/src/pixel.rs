//! Straight-alpha RGBA8 pixels and source-over compositing.
//!
//! All canvases in this crate share one fixed layout: 4 bytes per pixel,
//! RGBA order, straight (non-premultiplied) alpha.
//!
//! # Compositing
//!
//! [`Rgba8::over`] places a source pixel above a destination pixel with
//! the standard source-over formula on normalized channels:
//!
//! ```text
//! outA = srcA + dstA * (1 - srcA)
//! outC = (srcC * srcA + dstC * dstA * (1 - srcA)) / outA
//! ```
//!
//! When `outA == 0` the division uses 1 instead. Results are rounded to
//! the nearest 8-bit value.

/// Number of bytes per pixel in every canvas and patch buffer.
pub const BYTES_PER_PIXEL: usize = 4;

/// Pixel layout reported to image consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit RGBA, straight alpha.
    #[default]
    Rgba8,
}

impl PixelFormat {
    /// Number of channels.
    #[inline]
    pub const fn channels(&self) -> u32 {
        match self {
            Self::Rgba8 => 4,
        }
    }

    /// Bits per channel.
    #[inline]
    pub const fn bits_per_channel(&self) -> u32 {
        match self {
            Self::Rgba8 => 8,
        }
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 => BYTES_PER_PIXEL,
        }
    }
}

/// An 8-bit straight-alpha RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (255 = opaque)
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Creates a pixel from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Reads a pixel from the first four bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than 4.
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Returns the channels as `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns `true` if alpha is 255.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == u8::MAX
    }

    /// Composites `self` (source) over `dst` (destination).
    ///
    /// A fully opaque source returns itself unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anim_core::Rgba8;
    ///
    /// let red = Rgba8::new(255, 0, 0, 255);
    /// let half_green = Rgba8::new(0, 255, 0, 128);
    /// assert_eq!(half_green.over(red), Rgba8::new(127, 128, 0, 255));
    /// ```
    #[inline]
    pub fn over(self, dst: Rgba8) -> Rgba8 {
        if self.is_opaque() {
            return self;
        }

        let src_a = f32::from(self.a) / 255.0;
        let dst_a = f32::from(dst.a) / 255.0;
        let dst_w = dst_a * (1.0 - src_a);
        let out_a = src_a + dst_w;
        let div = if out_a == 0.0 { 1.0 } else { out_a };

        let channel = |s: u8, d: u8| -> u8 {
            let s = f32::from(s) / 255.0;
            let d = f32::from(d) / 255.0;
            to_u8((s * src_a + d * dst_w) / div)
        };

        Rgba8::new(
            channel(self.r, dst.r),
            channel(self.g, dst.g),
            channel(self.b, dst.b),
            to_u8(out_a),
        )
    }
}

impl From<[u8; 4]> for Rgba8 {
    #[inline]
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    #[inline]
    fn from(p: Rgba8) -> Self {
        p.to_array()
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
