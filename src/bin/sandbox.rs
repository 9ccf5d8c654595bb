//! Records Sandbox Server
//!
//! Run with: cargo run --bin records-sandbox
//!
//! Serves an in-memory copy of the records API for local development. Data is
//! lost on exit.
//!
//! # Configuration
//!
//! Read from the usual config locations, then environment variables:
//! - `RECORDS_SANDBOX_HOST`: Host to bind to (default: 127.0.0.1)
//! - `RECORDS_SANDBOX_PORT`: Port to listen on (default: 8000)
//! - `RECORDS_LOG_LEVEL`, `RECORDS_LOG_FORMAT`, `RUST_LOG`: Logging

use barangay_records::config::Config;
use barangay_records::logging;
use barangay_records::sandbox::{serve, SandboxState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::load_default();
    // The sandbox is for watching requests go by
    if std::env::var("RECORDS_LOG_LEVEL").is_err() && config.logging.level == "warn" {
        config.logging.level = "info".to_string();
    }
    logging::init(&config.logging);

    tracing::info!("Starting records sandbox v{}", env!("CARGO_PKG_VERSION"));

    let sandbox_config = config.sandbox_config();
    tracing::info!(
        "Point clients at RECORDS_API_URL=http://{}/api",
        sandbox_config.addr()
    );

    serve(SandboxState::new(), &sandbox_config).await?;

    tracing::info!("Records sandbox stopped");
    Ok(())
}
