//! Uniform view over still and animated inputs.
//!
//! Callers that accept "an image" do not need to care whether it came
//! from a single-frame file or an animation: both expose layers (one per
//! frame), a size, and a pixel format. Mipmaps are not modeled; every
//! source reports exactly one level.

use crate::canvas::{Canvas, Frame};
use crate::error::{Error, Result};
use crate::pixel::PixelFormat;
use crate::store::FrameStore;

/// A decoded image: one static canvas or a full animation.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Single-frame image.
    Static(Canvas),
    /// Decoded animation.
    Animated(FrameStore),
}

impl ImageSource {
    /// Canvas width.
    pub fn width(&self) -> u32 {
        match self {
            Self::Static(c) => c.width(),
            Self::Animated(s) => s.width(),
        }
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        match self {
            Self::Static(c) => c.height(),
            Self::Animated(s) => s.height(),
        }
    }

    /// Number of layers: 1 for a still, frame count for an animation.
    pub fn layer_count(&self) -> usize {
        match self {
            Self::Static(_) => 1,
            Self::Animated(s) => s.frame_count(),
        }
    }

    /// Always 1.
    #[inline]
    pub fn mipmap_count(&self) -> usize {
        1
    }

    /// Pixel layout of every layer.
    #[inline]
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    /// `true` for animations.
    #[inline]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }

    /// Pixels of layer `index`.
    pub fn layer(&self, index: usize) -> Result<&Canvas> {
        match self {
            Self::Static(c) if index == 0 => Ok(c),
            Self::Static(_) => Err(Error::index_out_of_range(index, 1)),
            Self::Animated(s) => s.frame(index).map(|f| &f.canvas),
        }
    }

    /// Playback rate for animations, `None` for stills.
    pub fn rate(&self) -> Option<f64> {
        match self {
            Self::Static(_) => None,
            Self::Animated(s) => Some(s.rate()),
        }
    }

    /// Converts into a frame store. A still becomes one frame lasting
    /// `duration_ms`.
    pub fn into_frame_store(self, duration_ms: u32) -> Result<FrameStore> {
        match self {
            Self::Static(c) => {
                let (w, h) = c.dimensions();
                FrameStore::new(w, h, vec![Frame::new(c, duration_ms)])
            }
            Self::Animated(s) => Ok(s),
        }
    }
}

impl From<Canvas> for ImageSource {
    fn from(canvas: Canvas) -> Self {
        Self::Static(canvas)
    }
}

impl From<FrameStore> for ImageSource {
    fn from(store: FrameStore) -> Self {
        Self::Animated(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgba8;

    #[test]
    fn test_static() {
        let src = ImageSource::from(Canvas::filled(3, 2, Rgba8::new(9, 9, 9, 255)).unwrap());
        assert_eq!((src.width(), src.height()), (3, 2));
        assert_eq!(src.layer_count(), 1);
        assert_eq!(src.mipmap_count(), 1);
        assert!(!src.is_animated());
        assert_eq!(src.rate(), None);
        assert!(src.layer(0).is_ok());
        assert!(src.layer(1).unwrap_err().is_bounds_error());

        let store = src.into_frame_store(80).unwrap();
        assert_eq!(store.frame_count(), 1);
        assert_eq!(store.frame(0).unwrap().duration_ms, 80);
    }

    #[test]
    fn test_animated() {
        let frames = vec![
            Frame::new(Canvas::new(2, 2).unwrap(), 100),
            Frame::new(Canvas::new(2, 2).unwrap(), 100),
        ];
        let src = ImageSource::from(FrameStore::new(2, 2, frames).unwrap());
        assert!(src.is_animated());
        assert_eq!(src.layer_count(), 2);
        assert_eq!(src.rate(), Some(10.0));
        assert_eq!(src.pixel_format(), PixelFormat::Rgba8);
        assert!(src.layer(2).is_err());
    }
}
