mod commands;
mod config;
mod models;
mod services;
mod ui;
mod utils;
mod wizard;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbosity.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    commands::handle(&cli.command).await?;

    Ok(())
}
