//! Cubane dbmigrate - reconcile declared models with the live schema.

use clap::Parser;

use cubane_cli::cli::Cli;
use cubane_cli::error::CliResult;
use cubane_cli::{migrate, output};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    migrate::run(cli).await
}
