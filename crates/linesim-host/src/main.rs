//! linesim: run a production line scenario and print its state.
//!
//! The simulation steps on its own thread; this thread only reads the
//! snapshots it publishes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linesim_host::{RunOptions, ViewFormat, Viewer, spawn};
use linesim_scenario::{ScenarioConfig, build, load_config};

#[derive(Parser)]
#[command(name = "linesim")]
#[command(about = "Behavior-tree driven production line simulator", version)]
struct Cli {
    /// Scenario file (.ron, .toml or .json). The reference line when omitted.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Steps to run; 0 runs until interrupted
    #[arg(short, long, default_value_t = 2_880)]
    ticks: u64,

    /// Override the scenario's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshots buffered for the viewer before new ones are dropped
    #[arg(long, default_value_t = 64)]
    queue_capacity: usize,

    /// Wall-clock pause after each step, in milliseconds
    #[arg(long, default_value_t = 0)]
    tick_interval_ms: u64,

    /// Print one snapshot every N ticks
    #[arg(long, default_value_t = 60)]
    every: u64,

    /// Skip any backlog and print only the newest snapshot
    #[arg(long)]
    latest_only: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ViewFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ViewFormat::Text,
            OutputFormat::Json => ViewFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.scenario {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }

    let engine = build(&config).context("failed to assemble the line")?;
    let options = RunOptions {
        ticks: (cli.ticks > 0).then_some(cli.ticks),
        tick_interval: Duration::from_millis(cli.tick_interval_ms),
        queue_capacity: cli.queue_capacity,
    };
    let (handle, feed) = spawn(engine, options).context("failed to start the simulation")?;

    let mut viewer = Viewer::new(
        std::io::stdout().lock(),
        cli.format.into(),
        cli.every,
        cli.latest_only,
    );
    if let Err(err) = viewer.follow(&feed, Duration::from_millis(2)) {
        handle.stop();
        handle.join()?;
        return Err(err).context("viewer stopped");
    }

    let summary = handle.join()?;
    info!(
        ticks = summary.ticks,
        published = summary.published,
        dropped = summary.dropped,
        shown = viewer.shown(),
        state_hash = %format!("{:016x}", summary.state_hash),
        "run finished"
    );
    Ok(())
}
