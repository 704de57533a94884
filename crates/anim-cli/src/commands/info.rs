//! Image info command.
//!
//! Shows canvas size, frame count, timing and container details.

use std::fs;
use std::path::Path;

use anim_core::ImageSource;
use anim_io::{webp, Format};
use anyhow::{Context, Result};
use serde::Serialize;

use crate::InfoArgs;

/// What `info` reports for one file.
#[derive(Debug, Serialize)]
struct FileInfo {
    file: String,
    format: String,
    width: u32,
    height: u32,
    frames: usize,
    animated: bool,
    /// Frames per second; absent for stills and unknown timing.
    #[serde(skip_serializing_if = "Option::is_none")]
    rate: Option<f64>,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    loop_count: Option<u16>,
    has_alpha: bool,
    size_bytes: u64,
}

impl FileInfo {
    fn gather(path: &Path) -> Result<Self> {
        let size_bytes = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let format = Format::detect(path).unwrap_or(Format::Unknown);
        let source = super::load_source(path)?;

        let (duration_ms, loop_count, has_alpha) = match &source {
            ImageSource::Animated(store) => (
                store.total_duration_ms(),
                Some(store.loop_count()),
                store.frames().any(|f| !f.canvas.is_opaque()),
            ),
            ImageSource::Static(canvas) => (0, None, !canvas.is_opaque()),
        };

        Ok(Self {
            file: path.display().to_string(),
            format: format!("{:?}", format),
            width: source.width(),
            height: source.height(),
            frames: source.layer_count(),
            animated: source.is_animated(),
            rate: source.rate().filter(|r| *r > 0.0),
            duration_ms,
            loop_count,
            has_alpha,
            size_bytes,
        })
    }
}

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let mut infos = Vec::with_capacity(args.input.len());
    for path in &args.input {
        infos.push(FileInfo::gather(path)?);
    }

    if args.json {
        let out = if infos.len() == 1 {
            serde_json::to_string_pretty(&infos[0])?
        } else {
            serde_json::to_string_pretty(&infos)?
        };
        println!("{}", out);
        return Ok(());
    }

    for (i, info) in infos.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_text(info, verbose);
        if verbose > 1 && info.format == "WebP" {
            print_container(Path::new(&info.file))?;
        }
    }
    Ok(())
}

fn print_text(info: &FileInfo, verbose: u8) {
    println!("{}", info.file);
    println!("  Resolution: {}x{}", info.width, info.height);
    println!("  Frames:     {}", info.frames);
    if let Some(rate) = info.rate {
        println!("  Rate:       {:.3} fps", rate);
    }
    if info.animated {
        println!("  Duration:   {} ms", info.duration_ms);
    }
    if let Some(loops) = info.loop_count {
        let label = if loops == 0 { "forever".to_string() } else { loops.to_string() };
        println!("  Loop:       {}", label);
    }
    println!("  File size:  {}", super::format_size(info.size_bytes));

    if verbose > 0 {
        println!("  Format:     {}", info.format);
        println!("  Alpha:      {}", info.has_alpha);
    }
}

fn print_container(path: &Path) -> Result<()> {
    let bytes = fs::read(path)?;
    let header = webp::probe(&bytes)?;
    println!("  Container:");
    println!("    animated:   {}", header.animated);
    println!("    alpha flag: {}", header.has_alpha);
    println!("    background: #{:08X} (BGRA)", header.background);
    Ok(())
}
