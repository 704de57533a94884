//! Canvas compositor: patches in, full frames out.
//!
//! Compositing is a sequential left fold. The accumulator is a
//! [`Compositor`] holding the *background* snapshot that seeds the next
//! frame; each [`Compositor::step`] consumes the accumulator and one
//! patch and returns the next accumulator plus the emitted [`Frame`].
//!
//! Per patch:
//!
//! 1. The frame starts as a copy of the background.
//! 2. Patch pixels are clipped to the canvas and either copied
//!    ([`BlendMethod::None`] or opaque source) or composited source-over
//!    ([`BlendMethod::AlphaBlend`]).
//! 3. The next background is the frame just produced, with the patch
//!    rectangle cleared to transparent if the patch disposes to
//!    [`DisposeMethod::Background`]. The emitted frame is never touched
//!    by the dispose step.
//!
//! # Example
//!
//! ```rust
//! use anim_core::{composite, Patch, Rgba8};
//!
//! let red = Patch::solid(0, 0, 2, 2, Rgba8::new(255, 0, 0, 255))?.with_duration(100);
//! let frames = composite(vec![red], 2, 2)?;
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].canvas.pixel_at(1, 1)?, Rgba8::new(255, 0, 0, 255));
//! # Ok::<(), anim_core::Error>(())
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::canvas::{Canvas, Frame};
use crate::error::{Error, Result};
use crate::patch::{BlendMethod, DisposeMethod, Patch, PatchSource};
use crate::pixel::{Rgba8, BYTES_PER_PIXEL};
use crate::progress::{Flow, Monotonic, ProgressSink};
use crate::rect::Rect;
use crate::store::FrameStore;

/// Fold accumulator for compositing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compositor {
    background: Canvas,
}

impl Compositor {
    /// Creates the initial state: a fully transparent `width x height` background.
    ///
    /// Fails with [`Error::CanvasTooLarge`] before allocating if the
    /// canvas does not fit in memory.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            background: Canvas::new(width, height)?,
        })
    }

    /// The buffer that seeds the next frame.
    #[inline]
    pub fn background(&self) -> &Canvas {
        &self.background
    }

    /// Canvas `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.background.dimensions()
    }

    /// Composites one patch, returning the next state and the emitted frame.
    pub fn step(self, patch: &Patch) -> (Compositor, Frame) {
        let (width, height) = self.background.dimensions();
        let rect = patch.clipped_rect(width, height);

        let mut frame = self.background;
        if let Some(rect) = rect {
            draw(&mut frame, patch, rect);
        }

        let background = match (patch.dispose, rect) {
            (DisposeMethod::Background, Some(rect)) => {
                let mut next = frame.clone();
                next.clear_rect(rect);
                next
            }
            _ => frame.clone(),
        };

        debug!(
            rect = ?rect,
            blend = ?patch.blend,
            dispose = ?patch.dispose,
            duration_ms = patch.duration_ms,
            "Composited patch"
        );

        (Compositor { background }, Frame::new(frame, patch.duration_ms))
    }
}

/// Composites an ordered patch sequence onto a `width x height` canvas.
///
/// Returns one frame per patch, in order. An empty sequence yields no
/// frames. Patches lying entirely off-canvas still produce a frame.
pub fn composite<I>(patches: I, width: u32, height: u32) -> Result<Vec<Frame>>
where
    I: IntoIterator<Item = Patch>,
{
    trace!(width, height, "compositor::composite");

    let mut state = Compositor::new(width, height)?;
    let mut frames = Vec::new();
    for patch in patches {
        let (next, frame) = state.step(&patch);
        state = next;
        frames.push(frame);
    }
    Ok(frames)
}

/// Drains a [`PatchSource`] into a [`FrameStore`].
///
/// Reports `(i + 1) * 100 / frame_count` after each frame. A source error
/// aborts with [`Error::SourceRead`]; a [`Flow::Stop`] from the sink
/// aborts with [`Error::Cancelled`]. No partial store is returned.
pub fn decode<S, P>(mut source: S, progress: &mut P) -> Result<FrameStore>
where
    S: PatchSource,
    P: ProgressSink + ?Sized,
{
    let (width, height) = source.canvas_size();
    let declared = source.frame_count();
    trace!(width, height, frames = declared, "compositor::decode");

    let mut progress = Monotonic::new(progress);
    let mut state = Compositor::new(width, height)?;
    let mut frames = Vec::with_capacity(declared);

    while let Some(patch) = source
        .next_patch()
        .map_err(|e| Error::source_read(e.to_string()))?
    {
        let (next, frame) = state.step(&patch);
        state = next;
        frames.push(frame);

        let total = declared.max(frames.len());
        let percent = (frames.len() * 100 / total) as u32;
        if progress.report(percent) == Flow::Stop {
            return Err(Error::Cancelled {
                percent: progress.last(),
            });
        }
    }

    if frames.len() != declared {
        debug!(declared, decoded = frames.len(), "Frame count differs from container header");
    }

    FrameStore::new(width, height, frames)
}

/// Writes the clipped part of `patch` into `frame`.
fn draw(frame: &mut Canvas, patch: &Patch, rect: Rect) {
    let stride = frame.stride();
    let src_stride = patch.width() as usize * BYTES_PER_PIXEL;
    // Source column of the first on-canvas pixel
    let src_x0 = (i64::from(rect.x) - i64::from(patch.x_offset)) as usize;
    let src_y0 = (i64::from(rect.y) - i64::from(patch.y_offset)) as usize;
    let dst_x0 = rect.x as usize * BYTES_PER_PIXEL;
    let span = rect.width as usize * BYTES_PER_PIXEL;
    let blend = patch.blend;
    let src = patch.data();

    let rows = &mut frame.as_bytes_mut()[rect.y as usize * stride..rect.bottom() as usize * stride];

    let draw_row = |(i, row): (usize, &mut [u8])| {
        let s = (src_y0 + i) * src_stride + src_x0 * BYTES_PER_PIXEL;
        let src_row = &src[s..s + span];
        let dst_row = &mut row[dst_x0..dst_x0 + span];
        match blend {
            BlendMethod::None => dst_row.copy_from_slice(src_row),
            BlendMethod::AlphaBlend => blend_row(dst_row, src_row),
        }
    };

    #[cfg(feature = "parallel")]
    rows.par_chunks_mut(stride).enumerate().for_each(draw_row);

    #[cfg(not(feature = "parallel"))]
    rows.chunks_mut(stride).enumerate().for_each(draw_row);
}

#[inline]
fn blend_row(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(src.chunks_exact(BYTES_PER_PIXEL))
    {
        if s[3] == u8::MAX {
            d.copy_from_slice(s);
        } else {
            let out = Rgba8::from_slice(s).over(Rgba8::from_slice(d));
            d.copy_from_slice(&out.to_array());
        }
    }
}
