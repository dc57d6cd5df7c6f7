/// Failure taxonomy for one relay attempt
/// Every variant is folded into an `error` outcome before it reaches HTTP.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to create assistant thread: {0}")]
    UpstreamCreateFailed(String),

    /// Carries the JSON parser's message untouched
    #[error("{0}")]
    ArgumentParseFailed(String),

    #[error("Run requires action but carried no tool calls")]
    MissingToolCall,

    #[error("Webhook unreachable: {0}")]
    WebhookUnreachable(String),

    #[error("Run ended with status {status}{}", .detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default())]
    RunEnded {
        status: String,
        detail: Option<String>,
    },

    #[error("Run did not finish within {0} seconds")]
    PollTimeout(u64),

    #[error("{0}")]
    UnhandledError(String),
}

impl RelayError {
    /// Stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidRequest(_) => "InvalidRequest",
            RelayError::UpstreamCreateFailed(_) => "UpstreamCreateFailed",
            RelayError::ArgumentParseFailed(_) => "ArgumentParseFailed",
            RelayError::MissingToolCall => "MissingToolCall",
            RelayError::WebhookUnreachable(_) => "WebhookUnreachable",
            RelayError::RunEnded { .. } => "RunEnded",
            RelayError::PollTimeout(_) => "PollTimeout",
            RelayError::UnhandledError(_) => "UnhandledError",
        }
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        // A collaborator may already have classified the failure
        match err.downcast::<RelayError>() {
            Ok(relay) => relay,
            Err(other) => RelayError::UnhandledError(other.to_string()),
        }
    }
}
