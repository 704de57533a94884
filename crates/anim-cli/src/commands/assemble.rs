//! Build an animation from still frames.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::AssembleArgs;

/// Expands glob patterns in order. Each pattern's matches are sorted;
/// a pattern with no glob characters is taken literally.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid pattern: {}", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        matched.sort();
        debug!(pattern = %pattern, matches = matched.len(), "Expanded pattern");
        paths.extend(matched);
    }
    Ok(paths)
}

/// Runs the assemble command.
pub fn run(args: AssembleArgs, verbose: u8) -> Result<()> {
    let paths = expand_inputs(&args.input)?;
    if paths.is_empty() {
        bail!("No input frames matched");
    }

    let config = super::encode_config(&args.encode, None);
    let store = anim_io::frames_from_stills(&paths, super::frame_duration_ms(config.target_rate))
        .context("Failed to load frames")?;
    super::save_animation(&args.output, &store, &config, verbose)?;

    info!(frames = store.frame_count(), output = %args.output.display(), "Assembled");
    if verbose > 0 {
        println!("{} frames -> {}", store.frame_count(), args.output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_sorted_and_literal() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pattern = format!("{}/*.png", dir.path().display());
        let literal = "missing.png".to_string();

        let paths = expand_inputs(&[pattern, literal]).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("a.png"),
                dir.path().join("b.png"),
                PathBuf::from("missing.png"),
            ]
        );
    }
}
