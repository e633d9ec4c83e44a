mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let logging = observability::Logging::init(cli.log_level.as_deref());

    let cfg = qconnect_config::load_config(cli.config.as_deref()).context("Failed to load settings")?;
    logging.apply_settings(&cfg.logging);

    match &cli.command {
        Commands::Servers => commands::servers::list(&cfg),
        Commands::UseCases => commands::use_cases::list(),
        Commands::Query(args) => commands::query::run(&cfg, args).await?,
    }

    Ok(())
}
