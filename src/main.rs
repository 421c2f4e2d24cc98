// Gesture Slicer command line entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use gesture_slicer::pipeline::TraceWriter;
use gesture_slicer::segmenter::load_config;
use gesture_slicer::{BatchRunner, SegmenterConfig};

/// Cut raw accelerometer/gyroscope recordings into labeled training windows
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of raw recording CSV files
    raw_dir: PathBuf,

    /// Output directory (recreated on every run)
    output_dir: PathBuf,

    /// JSON file with segmentation parameters
    #[arg(long, env = "SLICER_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for background sampling
    #[arg(long, env = "SLICER_SEED")]
    seed: Option<u64>,

    /// Probability of sampling each background index
    #[arg(long, env = "SLICER_BACKGROUND_RATE")]
    background_rate: Option<f64>,

    /// Append a JSONL trace of the run to this file
    #[arg(long, env = "SLICER_TRACE")]
    trace: Option<PathBuf>,

    /// Log debug output (progress, peak counts)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SegmenterConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(rate) = args.background_rate {
        config.background_rate = rate;
    }

    let mut runner = BatchRunner::new(config)?;
    if let Some(path) = args.trace {
        runner = runner.with_trace(TraceWriter::new(path));
    }

    let report = runner
        .run(&args.raw_dir, &args.output_dir)
        .context("Batch segmentation failed")?;

    println!(
        "{} recordings segmented, {} skipped: {} gesture windows, {}/{} non-gesture windows",
        report.summaries.len(),
        report.skipped.len(),
        report.onset_emitted(),
        report.background_emitted(),
        report.background_seen()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.name, skipped.reason);
    }

    Ok(())
}
