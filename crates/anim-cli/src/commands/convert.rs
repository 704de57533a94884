//! Re-encode an image or animation as animated WebP.

use anyhow::Result;
use tracing::{debug, info};

use crate::ConvertArgs;

/// Runs the convert command.
///
/// A still input becomes a one-frame animation lasting one frame interval.
pub fn run(args: ConvertArgs, verbose: u8) -> Result<()> {
    let source = super::load_source(&args.input)?;
    let source_rate = source.rate().filter(|r| *r > 0.0);
    let config = super::encode_config(&args.encode, source_rate);
    debug!(?config, "Encode settings");

    let store = source.into_frame_store(super::frame_duration_ms(config.target_rate))?;
    super::save_animation(&args.output, &store, &config, verbose)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        frames = store.frame_count(),
        fps = config.target_rate,
        "Converted"
    );
    if verbose > 0 {
        println!(
            "{} -> {} ({} frames @ {:.3} fps)",
            args.input.display(),
            args.output.display(),
            store.frame_count(),
            config.target_rate
        );
    }
    Ok(())
}
