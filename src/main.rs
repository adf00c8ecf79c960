//! Gridle - Grid Window Tiler
//!
//! Binary entry point: initializes logging, then hands control to the CLI,
//! which wires the session up against the system providers.

use gridle::logging::{init_logging, LogConfig};
use gridle::{GridleError, Result};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::from_env();
    init_logging(&log_config).map_err(|err| {
        GridleError::ConfigurationError(format!("Failed to initialize logging: {}", err))
    })?;

    if let Err(err) = gridle::cli::run().await {
        error!("Application error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
