use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_console::{drive, Args, JsonLinesRenderer, OutputFormat, TerminalRenderer};
use swarm_core::World;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Swarm console starting...");

    let settings = args.settings().context("Failed to load settings")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);
    log::debug!("Settings: {:?}", settings);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = World::new(&settings, &mut rng).context("Failed to create world")?;
    let pause = Duration::from_millis(settings.pause_ms);

    let stdout = io::stdout().lock();
    let outcome = match args.format {
        OutputFormat::Ascii => {
            let mut renderer = TerminalRenderer::new(stdout, args.clear);
            drive(&mut world, &mut renderer, args.ticks, pause)
        }
        OutputFormat::Json => {
            let mut renderer = JsonLinesRenderer::new(stdout);
            drive(&mut world, &mut renderer, args.ticks, pause)
        }
    };
    outcome.context("Simulation error")?;

    Ok(())
}
