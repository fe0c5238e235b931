//! Booking chat job worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p booking-chat-worker
//! ```

use booking_chat_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    if let Err(e) = try_init_tracing(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        concurrency = config.worker.concurrency,
        max_attempts = config.worker.max_attempts,
        "Configuration loaded"
    );

    booking_chat_worker::run(config).await?;

    Ok(())
}
