//! # anim-io
//!
//! File and container I/O for [`anim_core`].
//!
//! This crate supplies the concrete collaborators that anim-core only
//! knows as traits:
//!
//! - [`webp::WebpDemuxer`] - a [`PatchSource`](anim_core::PatchSource) over an animated WebP
//! - [`webp::WebpMuxer`] - a [`PatchEncoder`](anim_core::PatchEncoder) producing one
//! - [`still`] - PNG / JPEG / GIF / still WebP through the `image` crate
//! - [`riff`] - the RIFF chunk layer shared by both WebP directions
//!
//! ## Quick Start
//!
//! ```no_run
//! use anim_core::EncodeConfig;
//! use anim_io::{read_animation, write_animation};
//!
//! let store = read_animation("input.webp")?;
//! let config = EncodeConfig::default().with_quality(100).with_rate(store.rate());
//! write_animation("output.webp", &store, &config, &mut anim_core::NoProgress)?;
//! # Ok::<(), anim_io::IoError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - rayon for compositing and multi-file still loading (enabled by default)

#![warn(missing_docs)]

pub mod detect;
pub mod error;
pub mod riff;
pub mod still;
pub mod webp;

pub use detect::Format;
pub use error::{IoError, IoResult};

use std::fs;
use std::path::{Path, PathBuf};

use anim_core::{
    EncodeConfig, Frame, FrameStore, ImageSource, NoProgress, PatchSource, ProgressSink,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, trace};

use webp::{WebpDemuxer, WebpMuxer};

/// Opens any supported image.
///
/// An animated WebP becomes [`ImageSource::Animated`]; everything else,
/// including a still WebP, becomes [`ImageSource::Static`].
pub fn open<P: AsRef<Path>>(path: P) -> IoResult<ImageSource> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::WebP => {
            let bytes = fs::read(path)?;
            if webp::probe(&bytes)?.animated {
                Ok(ImageSource::Animated(decode_bytes(bytes)?))
            } else {
                Ok(ImageSource::Static(still::decode(&bytes)?))
            }
        }
        Format::Unknown => Err(IoError::UnsupportedFormat(path.display().to_string())),
        _ => Ok(ImageSource::Static(still::read(path)?)),
    }
}

/// Reads and composites an animated WebP file.
pub fn read_animation<P: AsRef<Path>>(path: P) -> IoResult<FrameStore> {
    read_animation_with_progress(path, &mut NoProgress)
}

/// Like [`read_animation`], reporting per-frame progress.
pub fn read_animation_with_progress<P, S>(path: P, progress: &mut S) -> IoResult<FrameStore>
where
    P: AsRef<Path>,
    S: ProgressSink + ?Sized,
{
    let path = path.as_ref();
    trace!(path = %path.display(), "read_animation");
    decode_bytes_with_progress(fs::read(path)?, progress)
}

/// Composites an in-memory WebP file into a [`FrameStore`].
pub fn decode_bytes(bytes: Vec<u8>) -> IoResult<FrameStore> {
    decode_bytes_with_progress(bytes, &mut NoProgress)
}

/// Like [`decode_bytes`], reporting per-frame progress.
pub fn decode_bytes_with_progress<S>(bytes: Vec<u8>, progress: &mut S) -> IoResult<FrameStore>
where
    S: ProgressSink + ?Sized,
{
    let demux = WebpDemuxer::from_bytes(bytes)?;
    let loop_count = demux.info().loop_count;
    let (width, height) = demux.canvas_size();

    let store = anim_core::decode(demux, progress)?.with_loop_count(loop_count);
    debug!(width, height, frames = store.frame_count(), rate = store.rate(), "Decoded animation");
    Ok(store)
}

/// Encodes `store` as an animated WebP in memory.
pub fn encode_bytes<S>(store: &FrameStore, config: &EncodeConfig, progress: &mut S) -> IoResult<Vec<u8>>
where
    S: ProgressSink + ?Sized,
{
    let muxer = WebpMuxer::new(store.width(), store.height(), config.loop_count)?;
    Ok(anim_core::encode(store, config, muxer, progress)?)
}

/// Encodes `store` and writes it to `path`.
///
/// Output goes to a temporary sibling first and is renamed into place
/// only after everything succeeded.
pub fn write_animation<P, S>(
    path: P,
    store: &FrameStore,
    config: &EncodeConfig,
    progress: &mut S,
) -> IoResult<()>
where
    P: AsRef<Path>,
    S: ProgressSink + ?Sized,
{
    let path = path.as_ref();
    let bytes = encode_bytes(store, config, progress)?;

    let partial = partial_path(path);
    if let Err(e) = fs::write(&partial, &bytes).and_then(|()| fs::rename(&partial, path)) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    info!(path = %path.display(), frames = store.frame_count(), bytes = bytes.len(), "Wrote animation");
    Ok(())
}

/// Loads stills as frames of one animation, each shown for `duration_ms`.
///
/// All images must share the first image's size.
pub fn frames_from_stills<P>(paths: &[P], duration_ms: u32) -> IoResult<FrameStore>
where
    P: AsRef<Path> + Sync,
{
    if paths.is_empty() {
        return Err(IoError::format("no input images"));
    }

    #[cfg(feature = "parallel")]
    let canvases = paths.par_iter().map(still::read).collect::<IoResult<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let canvases = paths.iter().map(still::read).collect::<IoResult<Vec<_>>>()?;

    let (width, height) = canvases[0].dimensions();
    let frames = canvases
        .into_iter()
        .map(|c| Frame::new(c, duration_ms))
        .collect();
    Ok(FrameStore::new(width, height, frames)?)
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}
