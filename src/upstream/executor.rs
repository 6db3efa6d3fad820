//! Upstream request executor.
//!
//! # Responsibilities
//! - Issue exactly one outbound request per spec
//! - Decode the upstream body without reshaping it
//! - Turn transport and non-2xx outcomes into failed ProxyResults
//!
//! # Design Decisions
//! - No retries; the client carries connect and total timeouts, and an
//!   expired one is a transport failure like any other
//! - The executor keeps no state between calls

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::observability::metrics;
use crate::upstream::error::RelayError;
use crate::upstream::request::UpstreamRequestSpec;
use crate::upstream::result::ProxyResult;

/// Anything that can carry an UpstreamRequestSpec to the provider.
#[async_trait]
pub trait UpstreamExecutor: Send + Sync {
    async fn execute(&self, spec: &UpstreamRequestSpec) -> ProxyResult;
}

/// reqwest-backed executor.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpExecutor {
    /// Create an executor whose calls give up after `timeout`.
    pub fn new(
        base_url: Url,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ephemail-relay/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join drops the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve_url(&self, path: &str) -> Result<Url, RelayError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path)
                .map_err(|e| RelayError::Validation(format!("Invalid upstream URL: {e}")));
        }
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RelayError::Validation(format!("Invalid upstream path: {e}")))
    }

    async fn send(&self, spec: &UpstreamRequestSpec) -> Result<ProxyResult, RelayError> {
        let url = self.resolve_url(spec.path())?;
        let headers = build_headers(spec.headers())?;

        let mut request = self
            .client
            .request(spec.method().as_reqwest(), url)
            .headers(headers);
        if let Some(body) = spec.body() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::from_transport(&e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::from_transport(&e))?;
        let payload = decode_body(&bytes);

        if status.is_success() {
            Ok(ProxyResult::success(status.as_u16(), payload))
        } else {
            Err(RelayError::Upstream {
                code: status.as_u16(),
                body: payload,
            })
        }
    }
}

#[async_trait]
impl UpstreamExecutor for HttpExecutor {
    async fn execute(&self, spec: &UpstreamRequestSpec) -> ProxyResult {
        let start = Instant::now();
        let operation = spec.operation();

        tracing::debug!(
            operation = %operation,
            method = %spec.method(),
            path = %spec.path(),
            "Forwarding to upstream"
        );

        match self.send(spec).await {
            Ok(result) => {
                metrics::record_upstream_request(operation.as_str(), "success", start);
                tracing::debug!(operation = %operation, status = result.status_code, "Upstream call succeeded");
                result
            }
            Err(e) => {
                let outcome = match e {
                    RelayError::Transport(_) => "transport_error",
                    RelayError::Upstream { .. } => "upstream_error",
                    _ => "invalid_request",
                };
                metrics::record_upstream_request(operation.as_str(), outcome, start);
                tracing::warn!(operation = %operation, error = %e, "Upstream call failed");
                ProxyResult::failure(operation, &e)
            }
        }
    }
}

fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap, RelayError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::Validation(format!("Invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| RelayError::Validation(format!("Invalid value for header '{name}'")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Empty → null, JSON → as is, text → string, binary → base64 string.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    if let Ok(value) = serde_json::from_slice(bytes) {
        return value;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => Value::String(STANDARD.encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn executor(base: &str) -> HttpExecutor {
        HttpExecutor::new(
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
            Duration::from_secs(25),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_body_shapes() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"a":[1,2]}"#), json!({"a": [1, 2]}));
        assert_eq!(decode_body(b"Not Found"), json!("Not Found"));
        assert_eq!(decode_body(&[0xff, 0x00, 0x10]), json!("/wAQ"));
    }

    #[test]
    fn test_base_url_keeps_its_path() {
        let exec = executor("https://example.test/v1");
        assert_eq!(
            exec.resolve_url("/messages").unwrap().as_str(),
            "https://example.test/v1/messages"
        );
    }

    #[test]
    fn test_absolute_paths_bypass_base() {
        let exec = executor("https://api.mail.tm");
        assert_eq!(
            exec.resolve_url("https://other.test/x").unwrap().as_str(),
            "https://other.test/x"
        );
    }

    #[test]
    fn test_invalid_header_is_validation_error() {
        let err = build_headers(&[("Authorization".into(), "Bearer a\nb".into())]).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }
}
