/// HTTP surface for the relay
/// `POST /run-booking` always answers 200; failures travel in the body as
/// `{"status": "error", ...}`.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use booking_protocol::{BookingOutcome, BookingRequest};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::orchestration::BookingOrchestrator;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn run_booking(
    State(relay): State<Arc<BookingOrchestrator>>,
    Json(payload): Json<BookingRequest>,
) -> Json<BookingOutcome> {
    Json(relay.handle(&payload.message).await)
}

pub fn router(relay: Arc<BookingOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run-booking", post(run_booking))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantService, Run, Thread, ToolOutput};
    use crate::orchestration::PollPolicy;
    use crate::webhook::{BookingWebhook, WebhookReply};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Assistant whose runs finish immediately, or whose thread creation fails
    struct InstantAssistant {
        healthy: bool,
    }

    #[async_trait]
    impl AssistantService for InstantAssistant {
        async fn create_thread(&self) -> Result<Thread> {
            if !self.healthy {
                return Err(anyhow!("HTTP request failed: connection refused"));
            }
            Ok(Thread {
                id: "thread_1".to_string(),
            })
        }

        async fn add_user_message(&self, _thread_id: &str, _content: &str) -> Result<()> {
            Ok(())
        }

        async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<Run> {
            Ok(serde_json::from_value(json!({"id": "run_1", "status": "queued"}))?)
        }

        async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
            Ok(serde_json::from_value(json!({"id": "run_1", "status": "completed"}))?)
        }

        async fn submit_tool_outputs(
            &self,
            _thread_id: &str,
            _run_id: &str,
            _outputs: &[ToolOutput],
        ) -> Result<Run> {
            Err(anyhow!("not expected"))
        }
    }

    struct SilentWebhook;

    #[async_trait]
    impl BookingWebhook for SilentWebhook {
        async fn forward(&self, _arguments: &Value) -> Result<WebhookReply> {
            Err(anyhow!("not expected"))
        }
    }

    fn app(healthy: bool) -> Router {
        let relay = BookingOrchestrator::new(
            Arc::new(InstantAssistant { healthy }),
            Arc::new(SilentWebhook),
            "asst_1",
            PollPolicy {
                interval: Duration::ZERO,
                timeout: None,
            },
        );
        router(Arc::new(relay))
    }

    async fn post_booking(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run-booking")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_run_booking_completed() {
        let (status, body) = post_booking(app(true), json!({"message": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "completed", "note": "No function call needed."})
        );
    }

    #[tokio::test]
    async fn test_errors_are_reported_with_200() {
        let (status, body) = post_booking(app(false), json!({"message": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["message"],
            "Failed to create assistant thread: HTTP request failed: connection refused"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(true)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
