//! Frame extraction: one PNG per composited frame.

use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::ExtractArgs;

/// Runs the extract command.
pub fn run(args: ExtractArgs, verbose: u8) -> Result<()> {
    let source = super::load_source(&args.input)?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;

    let count = source.layer_count();
    let digits = count.max(1).to_string().len().max(4);

    for i in 0..count {
        let canvas = source.layer(i)?;
        let path = args
            .output
            .join(format!("{}_{:0width$}.png", args.prefix, i, width = digits));
        anim_io::still::write_png(&path, canvas)
            .with_context(|| format!("Failed to save: {}", path.display()))?;
        if verbose > 0 {
            println!("{}", path.display());
        }
    }

    info!(frames = count, dir = %args.output.display(), "Extracted frames");
    Ok(())
}
