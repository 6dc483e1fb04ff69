//! Civitas - headless society simulation runner
//!
//! Founds a town, spawns a population and runs it for a number of ticks,
//! printing a summary or writing the full report as JSON.

use std::path::PathBuf;
use std::time::Instant;

use civitas::core::config::SimulationConfig;
use civitas::core::error::Result;
use civitas::simulation::{EventTally, SimContext, SimulationReport, World};
use clap::Parser;

/// Headless society simulation
#[derive(Parser, Debug)]
#[command(name = "civitas")]
#[command(about = "Run an agent society simulation and report on it")]
struct Args {
    /// TOML configuration file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML career catalog replacing the built-in careers
    #[arg(long)]
    careers: Option<PathBuf>,

    /// Random seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Initial population, overrides the config
    #[arg(long)]
    population: Option<usize>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Write the full report as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("civitas=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(population) = args.population {
        config.initial_population = population;
    }
    config.validate()?;

    let mut ctx = SimContext::new(config);
    if let Some(path) = &args.careers {
        ctx = ctx.load_careers(path)?;
    }

    let mut world = World::new(ctx);
    world.found_town();
    world.populate();
    tracing::info!(seed = world.config().seed, ticks = args.ticks, "simulation starting");

    let start = Instant::now();
    let mut tally = EventTally::default();
    for _ in 0..args.ticks {
        let events = world.step();
        tally.observe(&events);
        // No movement layer here; visitors arrive as soon as they ask
        for request in world.drain_destination_requests() {
            let outcome = world.notify_arrival(request.agent, request.building)?;
            tally.observe_arrival(&outcome);
        }
    }

    let report = SimulationReport::new(&world, tally, start.elapsed());
    println!("{}", report.summary());

    if let Some(path) = &args.json {
        std::fs::write(path, report.to_json())?;
        println!("Full report written to {}", path.display());
    }
    Ok(())
}
