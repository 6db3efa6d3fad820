//! Inbound request helpers.
//!
//! # Responsibilities
//! - Generate and propagate `x-request-id`
//! - Open one tracing span per request carrying that ID
//! - Parse JSON bodies leniently so missing fields become 400s with a message
//! - Pull the caller's bearer token from the body or `Authorization`

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, Request},
};
use serde::de::DeserializeOwned;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tracing::Span;

use crate::upstream::RelayError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning a UUID v4 request ID when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Access to the request ID set by [`set_request_id_layer`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .or_else(|| {
                self.headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
            })
            .unwrap_or("unknown")
    }
}

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request.request_id(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Deserialize a JSON body; an empty body counts as `{}`.
pub fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, RelayError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &body[..]
    };
    serde_json::from_slice(raw)
        .map_err(|e| RelayError::Validation(format!("Request body is not valid JSON: {e}")))
}

/// Trimmed value, or a validation error with `message` when absent or blank.
pub fn required(value: Option<String>, message: &str) -> Result<String, RelayError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::Validation(message.to_string()))
}

/// Token from `Authorization: Bearer <token>`, if any.
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Input {
        domain: Option<String>,
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let input: Input = json_body(&Bytes::new()).unwrap();
        assert!(input.domain.is_none());
    }

    #[test]
    fn test_invalid_json_is_validation_error() {
        let err = json_body::<Input>(&Bytes::from_static(b"{domain:")).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(Some("   ".into()), "Domain is required").is_err());
        assert!(required(None, "Domain is required").is_err());
        assert_eq!(required(Some(" a.com ".into()), "x").unwrap(), "a.com");
    }

    #[test]
    fn test_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_from_headers(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer   "));
        assert_eq!(bearer_from_headers(&headers), None);
    }

    #[test]
    fn test_request_id_falls_back_to_header() {
        let req = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.request_id(), "abc-123");

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(req.request_id(), "unknown");
    }
}
