//! denpush entry point.

mod app;
mod cli;
mod config;
mod render;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logs go to stderr and stay quiet by default so the progress bars
    // remain readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting denpush");

    let config = config::Config::load()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(cli, config))
}
