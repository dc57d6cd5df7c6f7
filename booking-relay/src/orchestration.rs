/// Orchestration logic for the booking relay
/// Shared by the CLI and the HTTP server:
/// - thread / message / run creation on the assistant service
/// - run polling until completion or a function call
/// - forwarding function arguments to the booking webhook
/// - acknowledging the tool call back to the assistant

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use booking_protocol::{BookingOutcome, BOOKING_LOGGED_ACK};
use serde_json::Value;
use tracing::Instrument;

use crate::assistant::{AssistantService, OpenAiAssistants, Run, RunStatus, ToolOutput, DEFAULT_BASE_URL};
use crate::error::RelayError;
use crate::webhook::{BookingWebhook, HttpWebhook};

/// How often and for how long a run is polled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits as long as the run keeps reporting a live status
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

/// Relay configuration, read once at startup
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub openai_api_key: String,
    pub assistant_id: String,
    pub webhook_url: String,
    pub openai_base_url: String,
    pub poll: PollPolicy,
    /// Listen port for the HTTP server
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} environment variable not set", key))
        };

        let openai_api_key = required("OPENAI_API_KEY")?;
        let assistant_id = required("ASSISTANT_ID")?;
        let webhook_url = required("BOOKING_WEBHOOK")?;

        let openai_base_url =
            lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let interval_ms = match lookup("RUN_POLL_INTERVAL_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| anyhow!("Invalid RUN_POLL_INTERVAL_MS '{}': {}", raw, e))?,
            None => 1000,
        };

        let timeout = match lookup("RUN_POLL_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| anyhow!("Invalid RUN_POLL_TIMEOUT_SECS '{}': {}", raw, e))?,
            )),
            None => None,
        };

        let port = match lookup("BOOKING_RELAY_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("Invalid BOOKING_RELAY_PORT '{}': {}", raw, e))?,
            None => 8000,
        };

        Ok(Self {
            openai_api_key,
            assistant_id,
            webhook_url,
            openai_base_url,
            poll: PollPolicy {
                interval: Duration::from_millis(interval_ms),
                timeout,
            },
            port,
        })
    }
}

/// What the polling loop ended on
enum PollEnd {
    Completed,
    RequiresAction(Run),
}

/// Drives one booking message through the assistant and on to the webhook.
/// Holds no per-request state; one instance serves every request.
pub struct BookingOrchestrator {
    assistant: Arc<dyn AssistantService>,
    webhook: Arc<dyn BookingWebhook>,
    assistant_id: String,
    poll: PollPolicy,
}

impl BookingOrchestrator {
    pub fn new(
        assistant: Arc<dyn AssistantService>,
        webhook: Arc<dyn BookingWebhook>,
        assistant_id: impl Into<String>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            assistant,
            webhook,
            assistant_id: assistant_id.into(),
            poll,
        }
    }

    /// Wire up the HTTP collaborators from configuration
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let assistant = OpenAiAssistants::new(&config.openai_api_key, &config.openai_base_url)?;
        let webhook = HttpWebhook::new(config.webhook_url.clone());

        Ok(Self::new(
            Arc::new(assistant),
            Arc::new(webhook),
            config.assistant_id.clone(),
            config.poll,
        ))
    }

    /// Relay one message. Never fails: every error becomes an `error` outcome.
    pub async fn handle(&self, message: &str) -> BookingOutcome {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("run_booking", %request_id);

        async {
            tracing::info!("Incoming booking message ({} chars)", message.chars().count());

            match self.relay(message).await {
                Ok(outcome) => {
                    tracing::info!("✓ Finished with status '{}'", outcome.status());
                    outcome
                }
                Err(e) => {
                    tracing::error!(kind = e.kind(), "✗ Booking relay failed: {}", e);
                    BookingOutcome::error(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn relay(&self, message: &str) -> Result<BookingOutcome, RelayError> {
        if message.trim().is_empty() {
            return Err(RelayError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let thread = self
            .assistant
            .create_thread()
            .await
            .map_err(|e| RelayError::UpstreamCreateFailed(e.to_string()))?;
        tracing::info!("✓ Created thread {}", thread.id);

        self.assistant.add_user_message(&thread.id, message).await?;

        let run = self
            .assistant
            .create_run(&thread.id, &self.assistant_id)
            .await?;
        tracing::info!("✓ Started run {} ({})", run.id, run.status);

        match self.poll_run(&thread.id, &run.id).await? {
            PollEnd::Completed => {
                tracing::info!("Run completed with no function call");
                Ok(BookingOutcome::completed())
            }
            PollEnd::RequiresAction(run) => self.relay_tool_call(&thread.id, &run).await,
        }
    }

    /// Poll until the run settles. A configured timeout bounds the whole wait,
    /// including a single poll that never answers.
    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<PollEnd, RelayError> {
        match self.poll.timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_until_settled(thread_id, run_id))
                .await
                .map_err(|_| RelayError::PollTimeout(limit.as_secs()))?,
            None => self.poll_until_settled(thread_id, run_id).await,
        }
    }

    async fn poll_until_settled(&self, thread_id: &str, run_id: &str) -> Result<PollEnd, RelayError> {
        let mut polls: u64 = 0;

        loop {
            let run = self.assistant.retrieve_run(thread_id, run_id).await?;
            polls += 1;

            match run.status.clone() {
                RunStatus::Completed => return Ok(PollEnd::Completed),
                RunStatus::RequiresAction => return Ok(PollEnd::RequiresAction(run)),
                status if status.is_dead_end() => {
                    return Err(RelayError::RunEnded {
                        status: status.to_string(),
                        detail: run.last_error.as_ref().and_then(|e| e.describe()),
                    });
                }
                status => {
                    tracing::debug!("Run {} is {} (poll {})", run_id, status, polls);
                }
            }

            tokio::time::sleep(self.poll.interval).await;
        }
    }

    async fn relay_tool_call(&self, thread_id: &str, run: &Run) -> Result<BookingOutcome, RelayError> {
        let tool_call = run.first_tool_call().ok_or(RelayError::MissingToolCall)?;
        tracing::info!(
            "Assistant is calling '{}' ({})",
            tool_call.function.name,
            tool_call.id
        );
        tracing::debug!("Raw function arguments: {:?}", tool_call.function.arguments);

        let arguments = parse_arguments(&tool_call.function.arguments)?;

        let reply = self.webhook.forward(&arguments).await?;

        let outputs = [ToolOutput {
            tool_call_id: tool_call.id.clone(),
            output: BOOKING_LOGGED_ACK.to_string(),
        }];
        self.assistant
            .submit_tool_outputs(thread_id, &run.id, &outputs)
            .await?;
        tracing::info!("✓ Acknowledged tool call {}", tool_call.id);

        Ok(BookingOutcome::BookingLogged {
            gpt_args: arguments,
            webhook_status: reply.status,
            webhook_response: reply.body,
        })
    }
}

/// Parse a tool call's argument string; it must hold a JSON object
pub fn parse_arguments(raw: &str) -> Result<Value, RelayError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| RelayError::ArgumentParseFailed(e.to_string()))?;

    if !value.is_object() {
        return Err(RelayError::ArgumentParseFailed(format!(
            "function arguments must be a JSON object, got {}",
            json_kind(&value)
        )));
    }

    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
