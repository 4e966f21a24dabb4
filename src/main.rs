use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod config;
mod handlers;
mod helpers;
mod router;
mod schemas;

#[cfg(test)]
mod openapi_tests;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

use cli::Cli;

/// Default log filter, overridden by `RUST_LOG`.
const DEFAULT_LOG_FILTER: &str = "wlacast=debug,compute=debug,tower_http=debug,axum::rejection=trace";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    model::init_tracing(DEFAULT_LOG_FILTER);
    debug!("Tracing initialized");

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
