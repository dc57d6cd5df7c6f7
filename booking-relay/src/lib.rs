/// Booking relay library
/// Exposes the orchestration logic for reuse in CLI and HTTP server modes

pub mod api;
pub mod assistant;
pub mod error;
pub mod orchestration;
pub mod webhook;

pub use assistant::{AssistantService, OpenAiAssistants, Run, RunStatus, ToolCall, ToolOutput};
pub use error::RelayError;
pub use orchestration::{BookingOrchestrator, PollPolicy, RelayConfig};
pub use webhook::{BookingWebhook, HttpWebhook, WebhookReply};

/// Install the `tracing` subscriber used by both binaries (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
