//! Trackline CLI binary.

use anyhow::Result;
use trackline::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the trackline CLI.
///
/// Uses tokio's current_thread runtime; every command is sequential file I/O.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=trackline=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trackline=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting trackline CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Trackline CLI completed successfully");
    Ok(())
}
