//! Agentwatch - Terminal client for launching and watching agent runs

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentwatch=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting agentwatch v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    agentwatch::cli::run()?;

    Ok(())
}
