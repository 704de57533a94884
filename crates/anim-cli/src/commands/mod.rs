//! CLI command implementations

pub mod assemble;
pub mod convert;
pub mod extract;
pub mod info;

use std::io::Write;
use std::path::Path;

use anim_core::{EncodeConfig, Flow, FrameStore, ImageSource};
use anyhow::{Context, Result};
use tracing::debug;

use crate::EncodeOpts;

/// Load image or animation from path
pub fn load_source(path: &Path) -> Result<ImageSource> {
    anim_io::open(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Encode and save animation to path
pub fn save_animation(path: &Path, store: &FrameStore, config: &EncodeConfig, verbose: u8) -> Result<()> {
    let mut progress = progress_printer("Encoding", verbose);
    let result = anim_io::write_animation(path, store, config, &mut progress);
    finish_progress(verbose);
    result.with_context(|| format!("Failed to save: {}", path.display()))
}

/// Builds the encoder config. Without `--fps` the source rate is kept;
/// an unknown source rate falls back to 24 fps.
pub fn encode_config(opts: &EncodeOpts, source_rate: Option<f64>) -> EncodeConfig {
    let rate = opts.fps.or(source_rate).unwrap_or(anim_core::timing::DEFAULT_RATE);
    EncodeConfig::default()
        .with_quality(opts.quality)
        .with_rate(rate)
        .with_loop_count(opts.loop_count)
}

/// Per-frame display time for stills at `fps`.
pub fn frame_duration_ms(fps: f64) -> u32 {
    anim_core::timing::interval_ms(fps).round() as u32
}

/// Progress sink that logs every step and, when verbose, prints a
/// percentage line to stderr.
pub fn progress_printer(label: &'static str, verbose: u8) -> impl FnMut(u32) -> Flow {
    move |percent| {
        debug!(percent, "{}", label);
        if verbose > 0 {
            eprint!("\r{}: {:3}%", label, percent);
            let _ = std::io::stderr().flush();
        }
        Flow::Continue
    }
}

fn finish_progress(verbose: u8) {
    if verbose > 0 {
        eprintln!();
    }
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
