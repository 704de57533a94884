//! anim - inspect and re-encode animated images
//!
//! Decodes animated WebP into full frames, writes them back out, and
//! builds animations from still frames.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "anim")]
#[command(author, version, about = "Inspect and re-encode animated images")]
#[command(long_about = "
Composites animated WebP files into full frames and re-encodes them.

Examples:
  anim info clip.webp                     # Size, frames, rate, loop count
  anim info *.webp --json                 # Machine-readable info
  anim extract clip.webp -o frames/       # One PNG per frame
  anim convert clip.webp -o out.webp -q 100
  anim convert still.png -o out.webp      # One-frame animation
  anim assemble 'frames/*.png' -o out.webp --fps 12
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image or animation information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Write every composited frame as a PNG
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Re-encode an image or animation as animated WebP
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Build an animated WebP from still frames
    #[command(visible_alias = "a")]
    Assemble(AssembleArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Input file
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// File name prefix for frames
    #[arg(long, default_value = "frame")]
    prefix: String,
}

/// Encoder settings shared by `convert` and `assemble`.
#[derive(Args, Clone, Copy)]
struct EncodeOpts {
    /// Quality 0-100 (100 = lossless)
    #[arg(short, long, default_value = "75", value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Output frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Loop count (0 = forever)
    #[arg(long = "loop", default_value = "0")]
    loop_count: u16,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input file
    input: PathBuf,

    /// Output file (.webp)
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    encode: EncodeOpts,
}

#[derive(Args)]
struct AssembleArgs {
    /// Input images or glob patterns, in frame order
    #[arg(required = true)]
    input: Vec<String>,

    /// Output file (.webp)
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    encode: EncodeOpts,
}

/// Installs the global subscriber. The returned guard flushes the log
/// file on drop and must live until exit.
fn init_logging(verbose: u8, log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_ansi(false);

    match log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            subscriber.with_writer(writer).init();
            Ok(Some(guard))
        }
        None => {
            subscriber.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Extract(args) => commands::extract::run(args, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Assemble(args) => commands::assemble::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "anim", "-vv", "convert", "in.webp", "-o", "out.webp", "-q", "100", "--fps", "12.5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.encode.quality, 100);
                assert_eq!(args.encode.fps, Some(12.5));
                assert_eq!(args.encode.loop_count, 0);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_quality_range() {
        assert!(Cli::try_parse_from(["anim", "convert", "a", "-o", "b", "-q", "101"]).is_err());
    }
}
