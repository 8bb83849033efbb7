//! Affect pipeline session replay.
//!
//! Reads a JSON-lines session (face landmark frames and audio windows),
//! runs them through the pipeline in order and writes one JSON frame report
//! per face frame to stdout.

use affect_pipeline::{
    config::{Config, EXAMPLE_CONFIG},
    filters::SmootherKind,
    pipeline::{AffectPipeline, SessionEvent},
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session file in JSON-lines format ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    session: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Landmark point count override (68 or 468)
    #[arg(short, long)]
    points: Option<usize>,

    /// Smoother override (kalman, exponential, none)
    #[arg(long)]
    smoother: Option<SmootherKind>,

    /// Facial weight override for fusion
    #[arg(long)]
    facial_weight: Option<f64>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Print an annotated example configuration and exit
    #[arg(long)]
    example_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.example_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path}");
            Config::from_file(path).with_context(|| format!("loading config {path}"))?
        }
        None => Config::default(),
    };
    if let Some(points) = args.points {
        config.landmarks.point_count = points;
    }
    if let Some(kind) = args.smoother {
        config.smoother.kind = kind;
    }
    if let Some(weight) = args.facial_weight {
        config.fusion.facial_weight = weight;
    }

    if args.print_config {
        config.validate()?;
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let mut pipeline = AffectPipeline::new(config).context("building pipeline")?;

    let reader: Box<dyn BufRead> = if args.session == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.session).with_context(|| format!("opening session {}", args.session))?;
        Box::new(BufReader::new(file))
    };
    let mut out = BufWriter::new(io::stdout().lock());

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: SessionEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping line {}: {e}", line_no + 1);
                continue;
            }
        };
        if let Some(report) = pipeline.process_event(&event) {
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    let stats = pipeline.stats();
    info!(
        "Processed {} frames ({} with geometry) and {} audio windows",
        stats.frames, stats.frames_with_geometry, stats.audio_windows
    );
    info!(
        "Fusion: {} consistent, {} conflicts; smiles: {} genuine, {} posed; {} micro-expressions",
        stats.consistent, stats.conflicts, stats.genuine_smiles, stats.fake_smiles, stats.micro_expressions
    );
    info!(
        "Eyes: {} blinks, {} prolonged closures",
        stats.blinks, stats.prolonged_closures
    );

    Ok(())
}
