//! Animated WebP support.
//!
//! The container layer (VP8X / ANIM / ANMF chunks) is handled here; the
//! per-frame VP8 and VP8L bitstreams go through the `image` crate.
//!
//! - [`WebpDemuxer`] yields one [`Patch`](anim_core::Patch) per ANMF chunk
//!   and plugs into [`anim_core::decode`].
//! - [`WebpMuxer`] compresses full frames and assembles the container; it
//!   plugs into [`anim_core::encode`].
//!
//! A non-animated WebP is treated as a one-frame animation covering the
//! whole canvas.
//!
//! # Codecs
//!
//! Lossless frames (quality 100) are written as VP8L by the `image`
//! encoder. Lossy frames go through libwebp with every field of the
//! [`EncoderProfile`] applied. Without the `lossy` feature, lossy
//! requests are encoded losslessly.
//!
//! # Example
//!
//! ```no_run
//! use anim_io::webp;
//!
//! let info = webp::probe(&std::fs::read("spinner.webp")?)?;
//! println!("{}x{}, {} frames", info.width, info.height, info.frame_count);
//! # Ok::<(), anim_io::IoError>(())
//! ```

mod demux;
mod mux;

pub use demux::WebpDemuxer;
pub use mux::WebpMuxer;

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use image::codecs::webp::{WebPDecoder, WebPEncoder};
use image::{ExtendedColorType, ImageDecoder, ImageEncoder, ImageFormat};

use anim_core::{Canvas, EncoderProfile};

use crate::riff::{self, Chunk, ALPH, ANIM, VP8X};
use crate::{IoError, IoResult};

/// VP8X flag: file contains an ANIM chunk and ANMF frames.
pub const FLAG_ANIMATION: u8 = 0x02;
/// VP8X flag: some frame carries transparency.
pub const FLAG_ALPHA: u8 = 0x10;

/// ANMF flag: dispose the frame rectangle to background.
pub const ANMF_DISPOSE: u8 = 0x01;
/// ANMF flag: overwrite instead of alpha blending.
pub const ANMF_NO_BLEND: u8 = 0x02;

/// Container-level metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebpInfo {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Number of frames (1 for a still).
    pub frame_count: usize,
    /// Loop count (0 = forever).
    pub loop_count: u16,
    /// Background color hint as stored in ANIM (BGRA byte order).
    pub background: u32,
    /// VP8X alpha flag, or the still bitstream has alpha.
    pub has_alpha: bool,
    /// `true` if the VP8X animation flag is set.
    pub animated: bool,
}

/// Reads container metadata without decoding any frame.
pub fn probe(bytes: &[u8]) -> IoResult<WebpInfo> {
    let chunks = riff::read_chunks(bytes)?;
    probe_chunks(bytes, &chunks)
}

pub(crate) fn probe_chunks(bytes: &[u8], chunks: &[Chunk]) -> IoResult<WebpInfo> {
    let Some(vp8x) = chunks.iter().find(|c| c.fourcc == VP8X) else {
        // Simple format: one bitstream, size lives inside it
        let decoder = WebPDecoder::new(Cursor::new(bytes))
            .map_err(|e| IoError::DecodeError(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        return Ok(WebpInfo {
            width,
            height,
            frame_count: 1,
            loop_count: 0,
            background: 0,
            has_alpha: decoder.color_type().has_alpha(),
            animated: false,
        });
    };

    if vp8x.payload.len() < 10 {
        return Err(IoError::format(format!("VP8X chunk is {} bytes, need 10", vp8x.payload.len())));
    }
    let flags = vp8x.payload[0];
    let mut cursor = Cursor::new(&vp8x.payload[4..10]);
    let width = riff::read_u24(&mut cursor)? + 1;
    let height = riff::read_u24(&mut cursor)? + 1;

    let animated = flags & FLAG_ANIMATION != 0;
    let (background, loop_count) = match chunks.iter().find(|c| c.fourcc == ANIM) {
        Some(anim) if anim.payload.len() >= 6 => {
            let mut cursor = Cursor::new(&anim.payload);
            (
                cursor.read_u32::<LittleEndian>()?,
                cursor.read_u16::<LittleEndian>()?,
            )
        }
        Some(_) => return Err(IoError::format("ANIM chunk shorter than 6 bytes")),
        None => (0, 0),
    };

    let frame_count = if animated {
        chunks.iter().filter(|c| c.fourcc == riff::ANMF).count()
    } else {
        1
    };

    Ok(WebpInfo {
        width,
        height,
        frame_count,
        loop_count,
        background,
        has_alpha: flags & FLAG_ALPHA != 0,
        animated,
    })
}

/// Decodes one frame bitstream (optional ALPH plus VP8 or VP8L) to RGBA8.
///
/// The chunks are rewrapped as a standalone still so the `image` decoder
/// can read them.
pub(crate) fn decode_frame(chunks: &[Chunk], width: u32, height: u32) -> IoResult<Vec<u8>> {
    let image: Vec<Chunk> = chunks.iter().filter(|c| c.is_image_data()).cloned().collect();
    if image.is_empty() {
        return Err(IoError::DecodeError("frame has no bitstream".into()));
    }

    let file = if image.iter().any(|c| c.fourcc == ALPH) {
        let mut wrapped = Vec::with_capacity(image.len() + 1);
        wrapped.push(vp8x_chunk(FLAG_ALPHA, width, height));
        wrapped.extend(image);
        riff::write_riff(&wrapped)
    } else {
        riff::write_riff(&image)
    };

    let decoded = image::load_from_memory_with_format(&file, ImageFormat::WebP)
        .map_err(|e| IoError::DecodeError(e.to_string()))?
        .to_rgba8();

    if decoded.dimensions() != (width, height) {
        return Err(IoError::DecodeError(format!(
            "bitstream is {}x{}, frame header says {}x{}",
            decoded.width(),
            decoded.height(),
            width,
            height
        )));
    }
    Ok(decoded.into_raw())
}

/// Compresses a full frame with `profile` and returns its image-data chunks.
pub(crate) fn encode_frame(canvas: &Canvas, profile: &EncoderProfile) -> IoResult<Vec<Chunk>> {
    let file = if profile.lossless {
        encode_lossless(canvas)?
    } else {
        encode_lossy(canvas, profile)?
    };

    let chunks: Vec<Chunk> = riff::read_chunks(&file)?
        .into_iter()
        .filter(Chunk::is_image_data)
        .collect();
    if chunks.is_empty() {
        return Err(IoError::EncodeError("encoder produced no bitstream".into()));
    }
    Ok(chunks)
}

fn encode_lossless(canvas: &Canvas) -> IoResult<Vec<u8>> {
    let (width, height) = canvas.dimensions();
    let mut file = Vec::new();
    WebPEncoder::new_lossless(&mut file)
        .write_image(canvas.as_bytes(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(file)
}

#[cfg(feature = "lossy")]
fn encode_lossy(canvas: &Canvas, profile: &EncoderProfile) -> IoResult<Vec<u8>> {
    use std::os::raw::c_int;

    let mut config = libwebp_sys::WebPConfig::new()
        .map_err(|()| IoError::EncodeError("libwebp config init failed".into()))?;
    config.lossless = 0;
    config.quality = f32::from(profile.quality);
    config.alpha_quality = c_int::from(profile.alpha_quality);
    config.near_lossless = c_int::from(profile.near_lossless);
    config.method = c_int::from(profile.method);
    config.segments = c_int::from(profile.segments);
    config.filter_strength = c_int::from(profile.filter_strength);
    config.partition_limit = c_int::from(profile.partition_limit);

    let (width, height) = canvas.dimensions();
    let memory = webp::Encoder::from_rgba(canvas.as_bytes(), width, height)
        .encode_advanced(&config)
        .map_err(|e| IoError::EncodeError(format!("libwebp: {:?}", e)))?;
    Ok(memory.to_vec())
}

#[cfg(not(feature = "lossy"))]
fn encode_lossy(canvas: &Canvas, _profile: &EncoderProfile) -> IoResult<Vec<u8>> {
    encode_lossless(canvas)
}

/// Builds a VP8X chunk for a `width x height` canvas.
pub(crate) fn vp8x_chunk(flags: u8, width: u32, height: u32) -> Chunk {
    let mut payload = vec![flags, 0, 0, 0];
    riff::write_u24(&mut payload, width.saturating_sub(1));
    riff::write_u24(&mut payload, height.saturating_sub(1));
    Chunk::new(VP8X, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_core::{EncodeConfig, Rgba8};

    fn profile(quality: u8) -> EncoderProfile {
        EncoderProfile::from_config(&EncodeConfig::default().with_quality(quality))
    }

    #[test]
    fn test_vp8x_layout() {
        let chunk = vp8x_chunk(FLAG_ANIMATION | FLAG_ALPHA, 400, 1);
        assert_eq!(chunk.payload, vec![0x12, 0, 0, 0, 0x8F, 0x01, 0, 0, 0, 0]);
    }

    #[test]
    fn test_frame_codec_lossless() {
        let mut canvas = Canvas::filled(5, 3, Rgba8::new(10, 20, 30, 255)).unwrap();
        canvas.set_pixel(2, 1, Rgba8::new(200, 100, 50, 128)).unwrap();

        let chunks = encode_frame(&canvas, &profile(100)).unwrap();
        let pixels = decode_frame(&chunks, 5, 3).unwrap();
        assert_eq!(pixels, canvas.as_bytes());
    }

    #[cfg(feature = "lossy")]
    #[test]
    fn test_frame_codec_lossy() {
        let mut canvas = Canvas::new(16, 16).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                let v = ((x * 16 + y * 7) % 256) as u8;
                canvas.set_pixel(x, y, Rgba8::new(v, 255 - v, (x * y) as u8, 255)).unwrap();
            }
        }

        let lossy = encode_frame(&canvas, &profile(5)).unwrap();
        assert!(lossy.iter().any(|c| c.fourcc == riff::VP8));
        assert!(lossy.iter().all(|c| c.fourcc != riff::VP8L));

        let pixels = decode_frame(&lossy, 16, 16).unwrap();
        assert_eq!(pixels.len(), canvas.as_bytes().len());
        assert_ne!(pixels, canvas.as_bytes());
    }

    #[cfg(feature = "lossy")]
    #[test]
    fn test_lossy_alpha_keeps_alph_chunk() {
        let mut canvas = Canvas::filled(8, 8, Rgba8::new(90, 40, 200, 255)).unwrap();
        canvas.set_pixel(3, 3, Rgba8::new(90, 40, 200, 0)).unwrap();

        let chunks = encode_frame(&canvas, &profile(50)).unwrap();
        assert!(chunks.iter().any(|c| c.fourcc == ALPH));
        let pixels = decode_frame(&chunks, 8, 8).unwrap();
        assert!(pixels[(3 * 8 + 3) * 4 + 3] < 128);
        assert_eq!(pixels[3], 255);
    }

    #[test]
    fn test_decode_rejects_size_mismatch() {
        let canvas = Canvas::filled(4, 4, Rgba8::new(1, 1, 1, 255)).unwrap();
        let chunks = encode_frame(&canvas, &profile(100)).unwrap();
        assert!(matches!(decode_frame(&chunks, 2, 2), Err(IoError::DecodeError(_))));
    }

    #[test]
    fn test_probe_still() {
        let canvas = Canvas::filled(6, 2, Rgba8::new(0, 0, 0, 255)).unwrap();
        let file = riff::write_riff(&encode_frame(&canvas, &profile(100)).unwrap());
        let info = probe(&file).unwrap();
        assert_eq!((info.width, info.height), (6, 2));
        assert_eq!(info.frame_count, 1);
        assert!(!info.animated);
    }
}
