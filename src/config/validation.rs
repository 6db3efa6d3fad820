//! Configuration validation.
//!
//! Serde handles syntax; this checks values: addresses parse, the base URL
//! is http(s), timeouts are positive and the upstream one is shorter than
//! the inbound one, route overrides name real operations
//! and carry well-formed templates. All errors are returned, not just the
//! first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::upstream::request::placeholders;
use crate::upstream::Operation;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let base_url = config.upstream.effective_base_url();
    match Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{base_url}' is not a URL: {e}"),
        )),
    }

    for (name, route) in &config.upstream.routes {
        let field = format!("upstream.routes.{name}");
        if let Err(e) = name.parse::<Operation>() {
            errors.push(ValidationError::new(&field, e));
        }
        if let Err(e) = placeholders(&route.path) {
            errors.push(ValidationError::new(&field, e.to_string()));
        }
    }

    let origin = &config.cors.allowed_origin;
    if origin != "*" && HeaderValue::from_str(origin).is_err() {
        errors.push(ValidationError::new(
            "cors.allowed_origin",
            format!("'{origin}' is not a valid origin"),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    let timeouts = &config.timeouts;
    if timeouts.connect_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.connect_secs",
            "must be greater than zero",
        ));
    }
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            "must be greater than zero",
        ));
    } else if timeouts.request_secs > 0 && timeouts.upstream_secs >= timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            format!(
                "must be less than timeouts.request_secs ({})",
                timeouts.request_secs
            ),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
