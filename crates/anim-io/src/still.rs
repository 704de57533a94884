//! Single-frame images through the `image` crate.
//!
//! Everything is converted to straight-alpha RGBA8 on load.

use std::path::Path;

use image::{ExtendedColorType, ImageFormat, ImageReader};
use tracing::trace;

use anim_core::Canvas;

use crate::detect::Format;
use crate::{IoError, IoResult};

/// Reads a still image (PNG, JPEG, GIF first frame, still WebP).
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Canvas> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    let image_format = format
        .image_format()
        .ok_or_else(|| IoError::UnsupportedFormat(path.display().to_string()))?;

    let mut reader = ImageReader::open(path)?;
    reader.set_format(image_format);
    let rgba = reader
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    trace!(path = %path.display(), ?format, width, height, "still::read");
    Ok(Canvas::from_raw(width, height, rgba.into_raw())?)
}

/// Decodes a still image held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<Canvas> {
    let format = Format::from_bytes(bytes)
        .image_format()
        .ok_or_else(|| IoError::UnsupportedFormat("unrecognized image bytes".into()))?;
    let rgba = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| IoError::DecodeError(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Canvas::from_raw(width, height, rgba.into_raw())?)
}

/// Writes `canvas` as an RGBA8 PNG.
pub fn write_png<P: AsRef<Path>>(path: P, canvas: &Canvas) -> IoResult<()> {
    let path = path.as_ref();
    image::save_buffer_with_format(
        path,
        canvas.as_bytes(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
    .map_err(|e| IoError::EncodeError(e.to_string()))?;
    trace!(path = %path.display(), "still::write_png");
    Ok(())
}
