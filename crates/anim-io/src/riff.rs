//! RIFF chunk codec for WebP containers.
//!
//! A WebP file is `"RIFF" <u32 size> "WEBP"` followed by chunks, each
//! `<fourcc> <u32 payload size> <payload>` padded to an even length. All
//! integers are little-endian. VP8X and ANMF headers also use 24-bit
//! fields, handled by [`read_u24`] and [`write_u24`].

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{IoError, IoResult};

/// FourCC of the extended header.
pub const VP8X: [u8; 4] = *b"VP8X";
/// FourCC of the animation parameters chunk.
pub const ANIM: [u8; 4] = *b"ANIM";
/// FourCC of one animation frame.
pub const ANMF: [u8; 4] = *b"ANMF";
/// FourCC of the alpha plane for lossy frames.
pub const ALPH: [u8; 4] = *b"ALPH";
/// FourCC of a lossy bitstream.
pub const VP8: [u8; 4] = *b"VP8 ";
/// FourCC of a lossless bitstream.
pub const VP8L: [u8; 4] = *b"VP8L";

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// One RIFF chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Four-character chunk id.
    pub fourcc: [u8; 4],
    /// Unpadded payload.
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Creates a chunk.
    pub fn new(fourcc: [u8; 4], payload: Vec<u8>) -> Self {
        Self { fourcc, payload }
    }

    /// Returns `true` if this chunk carries a frame bitstream or alpha plane.
    pub fn is_image_data(&self) -> bool {
        matches!(self.fourcc, ALPH | VP8 | VP8L)
    }

    /// Size on disk including header and padding.
    pub fn encoded_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.payload.len() + (self.payload.len() & 1)
    }

    /// Appends the encoded chunk to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.fourcc);
        // Vec<u8> writes are infallible
        let _ = out.write_u32::<LittleEndian>(self.payload.len() as u32);
        out.extend_from_slice(&self.payload);
        if self.payload.len() & 1 == 1 {
            out.push(0);
        }
    }

    /// Printable fourcc for diagnostics.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.fourcc).into_owned()
    }
}

/// Returns `true` if `bytes` starts with a RIFF/WEBP header.
pub fn is_webp(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_LEN && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

/// Parses the chunk list of a complete WebP file.
pub fn read_chunks(bytes: &[u8]) -> IoResult<Vec<Chunk>> {
    if !is_webp(bytes) {
        return Err(IoError::format("missing RIFF/WEBP header"));
    }
    let declared = (&bytes[4..8]).read_u32::<LittleEndian>()? as usize;
    // Declared size counts from the "WEBP" tag on; tolerate trailing bytes
    let end = declared
        .checked_add(8)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| IoError::format(format!("RIFF size {} exceeds file length {}", declared, bytes.len())))?;

    read_chunk_list(&bytes[HEADER_LEN..end])
}

/// Parses a bare sequence of chunks (the body of a RIFF file or an ANMF payload).
pub fn read_chunk_list(body: &[u8]) -> IoResult<Vec<Chunk>> {
    let mut cursor = Cursor::new(body);
    let mut chunks = Vec::new();

    while (cursor.position() as usize) + CHUNK_HEADER_LEN <= body.len() {
        let mut fourcc = [0u8; 4];
        cursor.read_exact(&mut fourcc)?;
        let size = cursor.read_u32::<LittleEndian>()? as usize;

        let start = cursor.position() as usize;
        let stop = start
            .checked_add(size)
            .filter(|&stop| stop <= body.len())
            .ok_or_else(|| {
                IoError::format(format!(
                    "chunk {} declares {} bytes, only {} left",
                    String::from_utf8_lossy(&fourcc),
                    size,
                    body.len() - start
                ))
            })?;

        chunks.push(Chunk::new(fourcc, body[start..stop].to_vec()));
        // Odd payloads carry one pad byte, which may be missing at EOF
        let next = (stop + (size & 1)).min(body.len());
        cursor.set_position(next as u64);
    }

    Ok(chunks)
}

/// Builds a complete WebP file from `chunks`.
pub fn write_riff(chunks: &[Chunk]) -> Vec<u8> {
    let body: usize = chunks.iter().map(Chunk::encoded_len).sum();
    let mut out = Vec::with_capacity(HEADER_LEN + body);
    out.extend_from_slice(b"RIFF");
    let _ = out.write_u32::<LittleEndian>((4 + body) as u32);
    out.extend_from_slice(b"WEBP");
    for chunk in chunks {
        chunk.write_to(&mut out);
    }
    out
}

/// Reads a 24-bit little-endian integer.
pub fn read_u24<R: Read>(r: &mut R) -> IoResult<u32> {
    Ok(r.read_u24::<LittleEndian>()?)
}

/// Appends a 24-bit little-endian integer; values above `0xFF_FFFF` are clamped.
pub fn write_u24(out: &mut Vec<u8>, value: u32) {
    let _ = out.write_u24::<LittleEndian>(value.min(MAX_U24));
}

/// Largest value a 24-bit field can hold.
pub const MAX_U24: u32 = 0xFF_FFFF;
