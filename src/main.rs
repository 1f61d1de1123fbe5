use anyhow::{bail, Context};
use clap::Parser;

use grid_astar::config::Config;
use grid_astar::simulation::Simulation;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let default_filter = if config.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    config.validate().context("invalid arguments")?;

    if !config.quiet {
        println!("Starting pathfinding comparison...");
        println!("Grid size: {}x{}", config.width, config.height);
        println!("Obstacle probability: {}", config.obstacle_probability);
        println!("Backend: {:?}", config.backend);
        println!("Runs: {}", config.runs);
        println!();
    }

    let mut simulation =
        Simulation::new(config.clone()).context("failed to set up the search backends")?;
    log::info!("using seed {}", simulation.seed());

    let report = simulation.run().context("search run failed")?;

    if !config.quiet {
        report.print_comparison_results();
    }

    let mismatches = report.mismatches().count();
    if mismatches > 0 || !report.backends_agree() {
        bail!(
            "{} searches disagreed with the reference cost (seed {})",
            mismatches,
            report.seed
        );
    }

    Ok(())
}
