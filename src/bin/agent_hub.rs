//! Agent Hub CLI Binary

use agent_hub::logging::init_logging;
use agent_hub::tooling::cli::{Cli, CliContext};
use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliContext::load_config(&cli).context("Error loading configuration")?;
    init_logging(Some(&config.logging)).context("Error initializing logging")?;

    let context = CliContext::new(config).context("Error initializing agent hub")?;
    let output = context.execute(&cli.command)?;
    println!("{}", output);
    Ok(())
}
