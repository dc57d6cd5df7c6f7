/// Wire types for the booking relay
/// Shared between the relay and anything that calls it or receives its webhook,
/// without depending on the relay's HTTP clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Note returned when the assistant finishes without calling a function
pub const NO_FUNCTION_CALL_NOTE: &str = "No function call needed.";

/// Tool output reported back to the assistant once a booking has been forwarded
pub const BOOKING_LOGGED_ACK: &str = "Booking logged successfully";

/// Body of `POST /run-booking`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub message: String,
}

/// Result of one relay attempt, tagged on `status`.
///
/// Every variant is delivered with HTTP 200; callers tell failures apart by
/// `status == "error"` only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum BookingOutcome {
    /// The run finished without requesting a function call
    #[serde(rename = "completed")]
    Completed { note: String },

    /// Function arguments were forwarded to the webhook
    #[serde(rename = "booking logged")]
    BookingLogged {
        /// Arguments exactly as parsed from the tool call
        gpt_args: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        webhook_status: Option<u16>,
        /// Webhook body: parsed JSON, or the raw text as a JSON string
        webhook_response: Value,
    },

    #[serde(rename = "error")]
    Error { message: String },
}

impl BookingOutcome {
    pub fn completed() -> Self {
        BookingOutcome::Completed {
            note: NO_FUNCTION_CALL_NOTE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        BookingOutcome::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BookingOutcome::Error { .. })
    }

    /// Value of the `status` field on the wire
    pub fn status(&self) -> &'static str {
        match self {
            BookingOutcome::Completed { .. } => "completed",
            BookingOutcome::BookingLogged { .. } => "booking logged",
            BookingOutcome::Error { .. } => "error",
        }
    }
}

/// Interpret a webhook body: JSON when it parses, otherwise the raw text
pub fn body_to_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_wire_shape() {
        let value = serde_json::to_value(BookingOutcome::completed()).unwrap();
        assert_eq!(
            value,
            json!({"status": "completed", "note": "No function call needed."})
        );
    }

    #[test]
    fn test_booking_logged_wire_shape() {
        let outcome = BookingOutcome::BookingLogged {
            gpt_args: json!({"name": "Ada", "date": "2024-05-01"}),
            webhook_status: Some(200),
            webhook_response: json!("OK"),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "booking logged");
        assert_eq!(value["gpt_args"]["name"], "Ada");
        assert_eq!(value["webhook_status"], 200);
        assert_eq!(value["webhook_response"], "OK");
    }

    #[test]
    fn test_missing_webhook_status_is_omitted() {
        let outcome = BookingOutcome::BookingLogged {
            gpt_args: json!({}),
            webhook_status: None,
            webhook_response: json!({"ok": true}),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("webhook_status").is_none());
    }

    #[test]
    fn test_error_wire_shape() {
        let value = serde_json::to_value(BookingOutcome::error("boom")).unwrap();
        assert_eq!(value, json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn test_body_to_json_falls_back_to_text() {
        assert_eq!(body_to_json(r#"{"id": 7}"#), json!({"id": 7}));
        assert_eq!(body_to_json("OK"), json!("OK"));
        assert_eq!(body_to_json(""), json!(""));
    }
}
