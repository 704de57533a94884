//! Format detection utilities.
//!
//! Detects image formats from magic bytes, falling back to the file extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::riff;
use crate::IoResult;

/// Formats this crate can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// WebP, still or animated.
    WebP,
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// GIF format (first frame only).
    Gif,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from file path.
    ///
    /// Checks magic bytes first, then the extension.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();

        let mut header = [0u8; 12];
        let mut file = File::open(path)?;
        let read = file.read(&mut header)?;

        match Self::from_bytes(&header[..read]) {
            Format::Unknown => Ok(Self::from_extension(path)),
            format => Ok(format),
        }
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("webp") => Format::WebP,
            Some("png") | Some("apng") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            Some("gif") => Format::Gif,
            _ => Format::Unknown,
        }
    }

    /// Detects format from leading bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if riff::is_webp(bytes) {
            return Format::WebP;
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Format::Png;
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Format::Jpeg;
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Format::Gif;
        }
        Format::Unknown
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::WebP => "webp",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Gif => "gif",
            Format::Unknown => "",
        }
    }

    /// Maps to the `image` crate's format id.
    pub(crate) fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Format::WebP => Some(image::ImageFormat::WebP),
            Format::Png => Some(image::ImageFormat::Png),
            Format::Jpeg => Some(image::ImageFormat::Jpeg),
            Format::Gif => Some(image::ImageFormat::Gif),
            Format::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_bytes() {
        assert_eq!(Format::from_bytes(b"RIFF\x10\0\0\0WEBPVP8L"), Format::WebP);
        assert_eq!(Format::from_bytes(b"\x89PNG\r\n\x1a\n"), Format::Png);
        assert_eq!(Format::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Format::Jpeg);
        assert_eq!(Format::from_bytes(b"GIF89a"), Format::Gif);
        assert_eq!(Format::from_bytes(b"RIFF\0\0\0\0WAVE"), Format::Unknown);
        assert_eq!(Format::from_bytes(b""), Format::Unknown);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("a/b/clip.WEBP"), Format::WebP);
        assert_eq!(Format::from_extension("frame.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
    }

    #[test]
    fn test_magic_beats_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.png");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"GIF89a\x01\0\x01\0").unwrap();
        drop(file);
        assert_eq!(Format::detect(&path).unwrap(), Format::Gif);
    }
}
