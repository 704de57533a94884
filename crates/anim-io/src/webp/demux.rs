//! WebP demultiplexer: container bytes to patches.

use std::io::Cursor;

use byteorder::ReadBytesExt;
use tracing::{debug, trace};

use anim_core::{BlendMethod, DisposeMethod, Patch, PatchSource};

use super::{decode_frame, probe_chunks, WebpInfo, ANMF_DISPOSE, ANMF_NO_BLEND};
use crate::riff::{self, Chunk, ANMF};
use crate::{IoError, IoResult};

/// ANMF header: offsets, size, duration, flags.
const ANMF_HEADER_LEN: usize = 16;

/// Frame placement parsed from an ANMF header; pixels stay compressed
/// until [`PatchSource::next_patch`] reaches it.
#[derive(Debug, Clone)]
struct FrameEntry {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    duration_ms: u32,
    blend: BlendMethod,
    dispose: DisposeMethod,
    chunks: Vec<Chunk>,
}

impl FrameEntry {
    fn parse(payload: &[u8]) -> IoResult<Self> {
        if payload.len() < ANMF_HEADER_LEN {
            return Err(IoError::format(format!(
                "ANMF chunk is {} bytes, header needs {}",
                payload.len(),
                ANMF_HEADER_LEN
            )));
        }
        let mut cursor = Cursor::new(&payload[..ANMF_HEADER_LEN]);
        // Offsets are stored halved
        let x = riff::read_u24(&mut cursor)? * 2;
        let y = riff::read_u24(&mut cursor)? * 2;
        let width = riff::read_u24(&mut cursor)? + 1;
        let height = riff::read_u24(&mut cursor)? + 1;
        let duration_ms = riff::read_u24(&mut cursor)?;
        let flags = cursor.read_u8()?;

        Ok(Self {
            x: x as i32,
            y: y as i32,
            width,
            height,
            duration_ms,
            blend: if flags & ANMF_NO_BLEND != 0 {
                BlendMethod::None
            } else {
                BlendMethod::AlphaBlend
            },
            dispose: if flags & ANMF_DISPOSE != 0 {
                DisposeMethod::Background
            } else {
                DisposeMethod::None
            },
            chunks: riff::read_chunk_list(&payload[ANMF_HEADER_LEN..])?,
        })
    }
}

/// Patch source over an in-memory WebP file.
///
/// The container is parsed up front; each frame's bitstream is decoded
/// only when it is requested.
#[derive(Debug, Clone)]
pub struct WebpDemuxer {
    info: WebpInfo,
    frames: std::vec::IntoIter<FrameEntry>,
    next_index: usize,
}

impl WebpDemuxer {
    /// Parses `bytes` as a WebP file.
    pub fn from_bytes(bytes: Vec<u8>) -> IoResult<Self> {
        let chunks = riff::read_chunks(&bytes)?;
        let info = probe_chunks(&bytes, &chunks)?;
        trace!(width = info.width, height = info.height, frames = info.frame_count, "WebpDemuxer::from_bytes");

        let frames = if info.animated {
            chunks
                .iter()
                .filter(|c| c.fourcc == ANMF)
                .map(|c| FrameEntry::parse(&c.payload))
                .collect::<IoResult<Vec<_>>>()?
        } else {
            vec![FrameEntry {
                x: 0,
                y: 0,
                width: info.width,
                height: info.height,
                duration_ms: 0,
                blend: BlendMethod::None,
                dispose: DisposeMethod::None,
                chunks: chunks.into_iter().filter(Chunk::is_image_data).collect(),
            }]
        };

        Ok(Self {
            info,
            frames: frames.into_iter(),
            next_index: 0,
        })
    }

    /// Container metadata.
    pub fn info(&self) -> &WebpInfo {
        &self.info
    }
}

impl PatchSource for WebpDemuxer {
    type Error = IoError;

    fn canvas_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn frame_count(&self) -> usize {
        self.info.frame_count
    }

    fn next_patch(&mut self) -> Result<Option<Patch>, IoError> {
        let Some(entry) = self.frames.next() else {
            return Ok(None);
        };
        let index = self.next_index;
        self.next_index += 1;

        let data = decode_frame(&entry.chunks, entry.width, entry.height)
            .map_err(|e| IoError::DecodeError(format!("frame {}: {}", index, e)))?;
        debug!(
            frame = index,
            x = entry.x,
            y = entry.y,
            width = entry.width,
            height = entry.height,
            duration_ms = entry.duration_ms,
            "Decoded ANMF"
        );

        let patch = Patch::new(entry.x, entry.y, entry.width, entry.height, data)?
            .with_blend(entry.blend)
            .with_dispose(entry.dispose)
            .with_duration(entry.duration_ms);
        Ok(Some(patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webp::{vp8x_chunk, FLAG_ANIMATION};

    fn anmf_header(x: u32, y: u32, w: u32, h: u32, duration: u32, flags: u8) -> Vec<u8> {
        let mut out = Vec::new();
        for v in [x / 2, y / 2, w - 1, h - 1, duration] {
            riff::write_u24(&mut out, v);
        }
        out.push(flags);
        out
    }

    #[test]
    fn test_parse_anmf_header() {
        let entry = FrameEntry::parse(&anmf_header(4, 10, 3, 2, 70, ANMF_DISPOSE)).unwrap();
        assert_eq!((entry.x, entry.y, entry.width, entry.height), (4, 10, 3, 2));
        assert_eq!(entry.duration_ms, 70);
        assert_eq!(entry.blend, BlendMethod::AlphaBlend);
        assert_eq!(entry.dispose, DisposeMethod::Background);
        assert!(entry.chunks.is_empty());

        let entry = FrameEntry::parse(&anmf_header(0, 0, 1, 1, 0, ANMF_NO_BLEND)).unwrap();
        assert_eq!(entry.blend, BlendMethod::None);
        assert_eq!(entry.dispose, DisposeMethod::None);
    }

    #[test]
    fn test_short_anmf_rejected() {
        assert!(matches!(FrameEntry::parse(&[0; 8]), Err(IoError::Format(_))));
    }

    #[test]
    fn test_frame_without_bitstream_fails_lazily() {
        let file = riff::write_riff(&[
            vp8x_chunk(FLAG_ANIMATION, 2, 2),
            Chunk::new(riff::ANIM, vec![0, 0, 0, 0, 0, 0]),
            Chunk::new(ANMF, anmf_header(0, 0, 2, 2, 50, 0)),
        ]);
        let mut demux = WebpDemuxer::from_bytes(file).unwrap();
        assert_eq!(demux.canvas_size(), (2, 2));
        assert_eq!(demux.frame_count(), 1);
        assert!(matches!(demux.next_patch(), Err(IoError::DecodeError(_))));
    }
}
