/// HTTP server for the booking relay
/// Exposes `POST /run-booking` and `GET /health`

use std::sync::Arc;

use anyhow::{Context, Result};
use booking_relay::{api, init_tracing, BookingOrchestrator, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();
    init_tracing();

    let config = RelayConfig::from_env()?;

    let port = config.port;

    tracing::info!("Server configuration:");
    tracing::info!("  Port: {}", port);
    tracing::info!("  Assistant: {}", config.assistant_id);
    tracing::info!("  Assistant API: {}", config.openai_base_url);
    tracing::info!("  Webhook: {}", config.webhook_url);
    match config.poll.timeout {
        Some(limit) => tracing::info!("  Run poll timeout: {}s", limit.as_secs()),
        None => tracing::info!("  Run poll timeout: none"),
    }

    let relay = Arc::new(BookingOrchestrator::from_config(&config)?);
    let app = api::router(relay);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind 0.0.0.0:{}", port))?;

    tracing::info!("✓ Booking relay running on http://0.0.0.0:{}", port);
    tracing::info!("  POST /run-booking — Relay a booking message");
    tracing::info!("  GET  /health      — Check server health");

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
