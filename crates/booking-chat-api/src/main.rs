//! Booking chat API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p booking-chat-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use booking_chat_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
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
        port = config.api.port,
        chat_enabled = config.chat.enabled,
        "Configuration loaded"
    );

    booking_chat_api::run(config).await?;

    Ok(())
}
