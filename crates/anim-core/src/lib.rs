//! # anim-core
//!
//! Core types for compositing and re-encoding animated raster images.
//!
//! An animated image arrives as an ordered run of *patches*: rectangles
//! of RGBA8 pixels placed at an offset on a fixed canvas, each with a
//! blend rule, a dispose rule and a display duration. This crate turns
//! that run into full frames and drives the reverse trip:
//!
//! - [`Canvas`], [`Frame`], [`Rgba8`], [`Rect`] - pixel storage and geometry
//! - [`Patch`], [`PatchSource`] - partial-frame input and the demuxer seam
//! - [`Compositor`], [`composite`], [`decode`] - patches to full frames
//! - [`FrameStore`] - read-only decoded animation with a derived rate
//! - [`encode`], [`PatchEncoder`], [`EncodeConfig`] - full frames to a container
//! - [`ImageSource`] - one interface over still and animated inputs
//! - [`ProgressSink`], [`Flow`] - progress reporting with cooperative stop
//!
//! ## Data Flow
//!
//! ```text
//! PatchSource --decode--> FrameStore --encode--> PatchEncoder --> bytes
//!                 |                                   ^
//!            Compositor (left fold)           EncoderProfile + timestamps
//! ```
//!
//! Container parsing and per-frame codecs live in `anim-io`; this crate
//! only sees them through [`PatchSource`] and [`PatchEncoder`].
//!
//! ## Feature Flags
//!
//! - `parallel` - Blend patch rows in parallel with rayon (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod canvas;
pub mod compositor;
pub mod encoder;
pub mod error;
pub mod patch;
pub mod pixel;
pub mod progress;
pub mod rect;
pub mod source;
pub mod store;
pub mod timing;

// Re-exports for convenience
pub use canvas::{Canvas, Frame};
pub use compositor::{composite, decode, Compositor};
pub use encoder::{encode, EncodeConfig, EncoderProfile, PatchEncoder};
pub use error::{Error, Result};
pub use patch::{BlendMethod, DisposeMethod, Patch, PatchSource, VecSource};
pub use pixel::{PixelFormat, Rgba8, BYTES_PER_PIXEL};
pub use progress::{Flow, NoProgress, ProgressSink};
pub use rect::Rect;
pub use source::ImageSource;
pub use store::FrameStore;
pub use timing::derive_rate;

/// Prelude module for convenient imports.
///
/// ```
/// use anim_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Frame};
    pub use crate::compositor::{composite, decode, Compositor};
    pub use crate::encoder::{encode, EncodeConfig, PatchEncoder};
    pub use crate::error::{Error, Result};
    pub use crate::patch::{BlendMethod, DisposeMethod, Patch, PatchSource};
    pub use crate::pixel::Rgba8;
    pub use crate::progress::{Flow, NoProgress, ProgressSink};
    pub use crate::source::ImageSource;
    pub use crate::store::FrameStore;
}
