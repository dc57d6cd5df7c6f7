/// Booking webhook client
/// Forwards parsed function arguments to the downstream endpoint that logs bookings.

use crate::error::RelayError;
use anyhow::Result;
use async_trait::async_trait;
use booking_protocol::body_to_json;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

/// What the webhook answered. The body shape is not contractual.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookReply {
    pub status: Option<u16>,
    /// Parsed JSON, or the raw text as a JSON string
    pub body: Value,
}

#[async_trait]
pub trait BookingWebhook: Send + Sync {
    async fn forward(&self, arguments: &Value) -> Result<WebhookReply>;
}

/// Posts arguments as a JSON body to a fixed URL
pub struct HttpWebhook {
    client: Client,
    url: String,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl BookingWebhook for HttpWebhook {
    async fn forward(&self, arguments: &Value) -> Result<WebhookReply> {
        tracing::info!("→ Forwarding booking to webhook {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(arguments)
            .send()
            .await
            .map_err(|e| RelayError::WebhookUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::WebhookUnreachable(format!("Failed to read response: {}", e)))?;

        let body = body_to_json(&text);
        if body.is_string() {
            tracing::warn!("⚠ Webhook returned non-JSON response ({} bytes)", text.len());
        }

        tracing::info!("✓ Webhook answered with status {}", status);

        Ok(WebhookReply {
            status: Some(status),
            body,
        })
    }
}
