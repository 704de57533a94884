//! WebP muxer: full frames to an animated container.

use tracing::{debug, trace, warn};

use anim_core::{Canvas, EncoderProfile, PatchEncoder};

use super::{encode_frame, vp8x_chunk, ANMF_NO_BLEND, FLAG_ALPHA, FLAG_ANIMATION};
use crate::riff::{self, Chunk, ANIM, ANMF, MAX_U24};
use crate::{IoError, IoResult};

/// ANIM background: opaque white, stored B, G, R, A.
const BACKGROUND_WHITE: u32 = 0xFFFF_FFFF;

#[derive(Debug)]
struct EncodedFrame {
    timestamp_ms: u64,
    chunks: Vec<Chunk>,
}

/// One encode session for an animated WebP.
///
/// Every frame is stored full-canvas at (0, 0) without blending or
/// disposal, so playback never depends on earlier frames. A frame's
/// duration is the gap to the next timestamp; the last frame runs until
/// the end timestamp passed to [`PatchEncoder::assemble`].
#[derive(Debug)]
pub struct WebpMuxer {
    width: u32,
    height: u32,
    loop_count: u16,
    frames: Vec<EncodedFrame>,
    has_alpha: bool,
    warned_lossy: bool,
}

impl WebpMuxer {
    /// Starts a session for a `width x height` canvas.
    pub fn new(width: u32, height: u32, loop_count: u16) -> IoResult<Self> {
        if width == 0 || height == 0 || width > MAX_U24 + 1 || height > MAX_U24 + 1 {
            return Err(IoError::UnsupportedFormat(format!(
                "WebP canvas must be 1..=16777216 on each side, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            loop_count,
            frames: Vec::new(),
            has_alpha: false,
            warned_lossy: false,
        })
    }

    /// Number of frames submitted so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn anmf_chunk(&self, frame: &EncodedFrame, duration_ms: u64) -> Chunk {
        let body: usize = frame.chunks.iter().map(Chunk::encoded_len).sum();
        let mut payload = Vec::with_capacity(16 + body);
        riff::write_u24(&mut payload, 0);
        riff::write_u24(&mut payload, 0);
        riff::write_u24(&mut payload, self.width - 1);
        riff::write_u24(&mut payload, self.height - 1);
        riff::write_u24(&mut payload, u32::try_from(duration_ms).unwrap_or(MAX_U24));
        payload.push(ANMF_NO_BLEND);
        for chunk in &frame.chunks {
            chunk.write_to(&mut payload);
        }
        Chunk::new(ANMF, payload)
    }
}

impl PatchEncoder for WebpMuxer {
    type Error = IoError;

    fn add(&mut self, frame: &Canvas, timestamp_ms: u64, profile: &EncoderProfile) -> IoResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(IoError::EncodeError(format!(
                "frame is {}x{}, canvas is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        if let Some(last) = self.frames.last() {
            if timestamp_ms <= last.timestamp_ms {
                return Err(IoError::EncodeError(format!(
                    "timestamp {} ms does not follow {} ms",
                    timestamp_ms, last.timestamp_ms
                )));
            }
        }
        if !cfg!(feature = "lossy") && !profile.lossless && !self.warned_lossy {
            warn!(quality = profile.quality, "Built without lossy WebP, encoding lossless");
            self.warned_lossy = true;
        }

        let chunks = encode_frame(frame, profile)?;
        self.has_alpha |= !frame.is_opaque();
        trace!(timestamp_ms, chunks = chunks.len(), "WebpMuxer::add");
        self.frames.push(EncodedFrame { timestamp_ms, chunks });
        Ok(())
    }

    fn assemble(self, end_timestamp_ms: u64) -> IoResult<Vec<u8>> {
        if self.frames.is_empty() {
            return Err(IoError::EncodeError("no frames to assemble".into()));
        }

        let mut flags = FLAG_ANIMATION;
        if self.has_alpha {
            flags |= FLAG_ALPHA;
        }

        let mut anim = Vec::with_capacity(6);
        anim.extend_from_slice(&BACKGROUND_WHITE.to_le_bytes());
        anim.extend_from_slice(&self.loop_count.to_le_bytes());

        let mut chunks = Vec::with_capacity(self.frames.len() + 2);
        chunks.push(vp8x_chunk(flags, self.width, self.height));
        chunks.push(Chunk::new(ANIM, anim));

        for (i, frame) in self.frames.iter().enumerate() {
            let next = self
                .frames
                .get(i + 1)
                .map_or(end_timestamp_ms, |f| f.timestamp_ms);
            let duration = next.saturating_sub(frame.timestamp_ms);
            chunks.push(self.anmf_chunk(frame, duration));
        }

        let bytes = riff::write_riff(&chunks);
        debug!(frames = self.frames.len(), bytes = bytes.len(), alpha = self.has_alpha, "Assembled WebP");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webp::probe;
    use anim_core::{EncodeConfig, Rgba8};

    fn lossless() -> EncoderProfile {
        EncoderProfile::from_config(&EncodeConfig::default().with_quality(100))
    }

    #[test]
    fn test_empty_session_fails() {
        let mux = WebpMuxer::new(4, 4, 0).unwrap();
        assert!(matches!(mux.assemble(0), Err(IoError::EncodeError(_))));
    }

    #[test]
    fn test_rejects_zero_canvas() {
        assert!(WebpMuxer::new(0, 4, 0).is_err());
    }

    #[test]
    fn test_rejects_wrong_size_and_order() {
        let mut mux = WebpMuxer::new(2, 2, 0).unwrap();
        let small = Canvas::new(1, 1).unwrap();
        assert!(mux.add(&small, 0, &lossless()).is_err());

        let ok = Canvas::filled(2, 2, Rgba8::new(5, 5, 5, 255)).unwrap();
        mux.add(&ok, 10, &lossless()).unwrap();
        assert!(mux.add(&ok, 10, &lossless()).is_err());
        assert_eq!(mux.frame_count(), 1);
    }

    #[cfg(feature = "lossy")]
    fn frame_bitstreams(bytes: &[u8]) -> Vec<[u8; 4]> {
        riff::read_chunks(bytes)
            .unwrap()
            .into_iter()
            .filter(|c| c.fourcc == ANMF)
            .flat_map(|c| riff::read_chunk_list(&c.payload[16..]).unwrap())
            .map(|c| c.fourcc)
            .collect()
    }

    #[cfg(feature = "lossy")]
    #[test]
    fn test_quality_selects_bitstream() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                canvas
                    .set_pixel(x, y, Rgba8::new((x * 32) as u8, (y * 32) as u8, 128, 255))
                    .unwrap();
            }
        }
        let run = |quality: u8| {
            let profile = EncoderProfile::from_config(&EncodeConfig::default().with_quality(quality));
            let mut mux = WebpMuxer::new(8, 8, 0).unwrap();
            mux.add(&canvas, 0, &profile).unwrap();
            mux.assemble(40).unwrap()
        };

        let lossy = run(5);
        let exact = run(100);
        assert_ne!(lossy, exact);
        assert_eq!(frame_bitstreams(&lossy), vec![riff::VP8]);
        assert_eq!(frame_bitstreams(&exact), vec![riff::VP8L]);
    }

    #[test]
    fn test_container_metadata() {
        let mut mux = WebpMuxer::new(3, 2, 5).unwrap();
        let opaque = Canvas::filled(3, 2, Rgba8::new(1, 2, 3, 255)).unwrap();
        let clear = Canvas::new(3, 2).unwrap();
        mux.add(&opaque, 0, &lossless()).unwrap();
        mux.add(&clear, 40, &lossless()).unwrap();
        let bytes = mux.assemble(80).unwrap();

        let info = probe(&bytes).unwrap();
        assert!(info.animated);
        assert!(info.has_alpha);
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.frame_count, 2);
        assert_eq!(info.loop_count, 5);
        assert_eq!(info.background, BACKGROUND_WHITE);
    }
}
