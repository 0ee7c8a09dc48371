//! Headless preview: run the neuron field for a while and write the last
//! frame as a PNG.
//!
//! Run with: `cargo run --release -- --frames 300 --output field.png`

use anyhow::{Context, Result};
use clap::Parser;
use neurofield::snapshot::{self, SnapshotOptions};
use neurofield::{Clock, FieldConfig, NeuronField};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "neurofield-preview", about = "Render a neuron field frame to PNG")]
struct Args {
    /// JSON config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible field. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to simulate before the snapshot.
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Output image path.
    #[arg(long, short, default_value = "neurofield.png")]
    output: PathBuf,

    /// Write the effective config as JSON next to the image.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => FieldConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FieldConfig::default(),
    };

    if args.dump_config {
        let path = args.output.with_extension("json");
        config
            .save(&path)
            .with_context(|| format!("writing config {}", path.display()))?;
        info!(path = %path.display(), "config written");
    }

    let mut field = match args.seed {
        Some(seed) => NeuronField::with_seed(config, seed),
        None => NeuronField::initialize(config),
    }
    .context("invalid field config")?;

    info!(
        particles = field.particles().len(),
        pulses = field.pulses().len(),
        frames = args.frames,
        "simulating"
    );

    let mut clock = Clock::fixed(1.0 / args.fps.max(1.0));
    let mut peak_connections = 0;
    let mut peak_pulses = 0;
    for _ in 0..args.frames {
        let frame = field.tick(&mut clock);
        peak_connections = peak_connections.max(frame.connection_count());
        peak_pulses = peak_pulses.max(field.pulses().iter().filter(|p| p.is_active()).count());
    }

    info!(
        elapsed = clock.elapsed(),
        connections = field.frame().connection_count(),
        peak_connections,
        peak_pulses,
        "simulation done"
    );

    let options = SnapshotOptions::default().with_size(args.width, args.height);
    snapshot::save(field.frame(), &field.transform(), &options, &args.output)
        .with_context(|| format!("writing snapshot {}", args.output.display()))?;
    info!(path = %args.output.display(), "snapshot written");

    field.dispose();
    Ok(())
}
