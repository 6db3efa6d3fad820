//! Error taxonomy for the relay path and its single status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::upstream::routes::Operation;

/// Everything that can go wrong between an inbound call and its upstream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelayError {
    /// A required input is missing or malformed. Never reaches the upstream.
    #[error("{0}")]
    Validation(String),

    /// The caller's credentials were rejected or no token was issued.
    #[error("{0}")]
    Unauthorized(String),

    /// DNS, connect, TLS or timeout failure talking to the upstream.
    #[error("{0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {code}")]
    Upstream { code: u16, body: Value },

    /// The configured provider has no route for this operation.
    #[error("operation '{0}' is not offered by the configured upstream provider")]
    Unsupported(Operation),
}

impl RelayError {
    /// Local HTTP status for this error.
    ///
    /// Upstream 4xx codes are preserved so callers can tell a bad token from
    /// a missing message; every other upstream or transport failure is 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream { code, .. } => match StatusCode::from_u16(*code) {
                Ok(status) if status.is_client_error() => status,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RelayError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Human-readable detail, preferring the upstream's own message.
    pub fn detail(&self) -> String {
        match self {
            RelayError::Upstream { code, body } => upstream_message(body)
                .unwrap_or_else(|| format!("upstream returned status {code}")),
            other => other.to_string(),
        }
    }

    /// The upstream's error body, when there was one.
    pub fn upstream_body(&self) -> Option<&Value> {
        match self {
            RelayError::Upstream { body, .. } if !body.is_null() => Some(body),
            _ => None,
        }
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "upstream request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to upstream".to_string()
        } else if err.is_decode() {
            "could not read upstream response".to_string()
        } else {
            err.to_string()
        };
        RelayError::Transport(detail)
    }
}

/// Pull a message out of the shapes the known providers use for errors.
fn upstream_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["hydra:description", "detail", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "status": false,
            "message": self.detail(),
        });
        if let Some(upstream) = self.upstream_body() {
            body["upstream"] = upstream.clone();
        }
        (status, Json(body)).into_response()
    }
}
