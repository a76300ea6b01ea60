//! Blockgraph CLI binary.

use anyhow::Result;
use blockgraph::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the blockgraph CLI.
///
/// Uses tokio's `current_thread` runtime; every command is a short sequence
/// of file reads, store operations and at most one renderer process.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Example: RUST_LOG=blockgraph=debug,blockgraph_dot=debug blockgraph graph 5
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blockgraph=info,blockgraph_dot=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting blockgraph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Blockgraph CLI completed successfully");
    Ok(())
}
