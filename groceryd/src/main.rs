//! Grocery Daemon
//!
//! GraphQL API server for stores, departments, products and grocery lists.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration (memory store seeded from data/grocery.json)
//! cargo run -p groceryd
//!
//! # Persist changes to a JSON file on another port
//! GROCERY_STORAGE=file GROCERY_DATA_PATH=/var/lib/grocery.json PORT=4000 cargo run -p groceryd
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default depends on `GROCERY_ENV`)
//! - `PORT`: API port (default: 3000)
//! - `GROCERY_API_HOST`: API host (default: 0.0.0.0)
//! - `GROCERY_ENV`: Environment (test, development, production; production logs JSON)
//! - `GROCERY_STORAGE`: Storage backend (memory, file; default: memory)
//! - `GROCERY_DATA_PATH`: Data file (default: data/grocery.json)

use groceryd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (the environment picks the log format)
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.log_directive()));
    let fmt_layer = if config.environment.json_logs() {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };
    tracing_subscriber::registry().with(fmt_layer).with(filter).init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        storage = %config.storage,
        "Grocery Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::from_config(config).await?;
    daemon.run().await?;

    Ok(())
}
