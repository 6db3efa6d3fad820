//! Normalized outcome of one upstream call.

use serde::Serialize;
use serde_json::{json, Value};

use crate::upstream::error::RelayError;
use crate::upstream::routes::Operation;

/// What a route handler gets back from the executor.
///
/// On success `payload` is the upstream body untouched. On failure it is
/// `{"message": "Error <operation>: <detail>", "upstream": <body>?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResult {
    pub success: bool,
    pub status_code: u16,
    pub payload: Value,
}

impl ProxyResult {
    pub fn success(status_code: u16, payload: Value) -> Self {
        Self {
            success: true,
            status_code,
            payload,
        }
    }

    pub fn failure(operation: Operation, error: &RelayError) -> Self {
        let mut payload = json!({
            "message": format!("Error {}: {}", operation.label(), error.detail()),
        });
        if let Some(upstream) = error.upstream_body() {
            payload["upstream"] = upstream.clone();
        }
        Self {
            success: false,
            status_code: error.status_code().as_u16(),
            payload,
        }
    }

    /// The failure message, if this is a failure.
    pub fn message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.payload.get("message").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_is_500_with_message() {
        let err = RelayError::Transport("could not connect to upstream".into());
        let result = ProxyResult::failure(Operation::ListMessages, &err);
        assert!(!result.success);
        assert_eq!(result.status_code, 500);
        assert_eq!(
            result.message(),
            Some("Error fetching messages: could not connect to upstream")
        );
        assert!(result.payload.get("upstream").is_none());
    }

    #[test]
    fn test_upstream_failure_carries_body() {
        let body = json!({"code": 401, "message": "Invalid credentials."});
        let err = RelayError::Upstream { code: 401, body: body.clone() };
        let result = ProxyResult::failure(Operation::IssueToken, &err);
        assert_eq!(result.status_code, 401);
        assert_eq!(result.payload["upstream"], body);
        assert_eq!(result.message(), Some("Error authenticating: Invalid credentials."));
    }

    #[test]
    fn test_serializes_status_code_in_camel_case() {
        let result = ProxyResult::success(200, json!([]));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["success"], true);
    }
}
