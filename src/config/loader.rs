//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load the optional file, apply process environment overrides, validate.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(addr) = get("RELAY_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(port) = get("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{host}:{port}");
            }
            Err(_) => tracing::warn!(port = %port, "Ignoring invalid PORT"),
        }
    }

    if let Some(provider) = get("RELAY_PROVIDER") {
        match provider.parse() {
            Ok(provider) => config.upstream.provider = provider,
            Err(e) => tracing::warn!(error = %e, "Ignoring invalid RELAY_PROVIDER"),
        }
    }
    if let Some(url) = get("RELAY_UPSTREAM_BASE_URL") {
        config.upstream.base_url = Some(url);
    }
    if let Some(key) = get("RELAY_API_KEY").or_else(|| get("RAPIDAPI_KEY")) {
        config.upstream.api_key = Some(key);
    }
    if let Some(host) = get("RELAY_API_HOST") {
        config.upstream.api_host = Some(host);
    }
    if let Some(origin) = get("RELAY_ALLOWED_ORIGIN") {
        config.cors.allowed_origin = origin;
    }
}
