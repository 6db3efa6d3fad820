//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file and
//! every field has a default, so an empty file (or none at all) is valid.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::upstream::{Operation, Provider, RouteSpec, RouteTable, UpstreamAuth};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream provider and its credentials.
    pub upstream: UpstreamConfig,

    /// Cross-origin policy for the browser front-end.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Which provider to relay to.
    pub provider: Provider,

    /// Base URL; the provider's public endpoint when unset.
    pub base_url: Option<String>,

    /// Static API key for key-authenticated providers.
    pub api_key: Option<String>,

    /// Header carrying the API key.
    pub api_key_header: String,

    /// Value of the host header sent alongside the key.
    pub api_host: Option<String>,

    /// Header carrying the API host.
    pub api_host_header: String,

    /// Per-operation overrides of the provider's route table,
    /// keyed by operation name (e.g. `list_domains`).
    pub routes: BTreeMap<String, RouteSpec>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: None,
            api_key: None,
            api_key_header: "x-rapidapi-key".to_string(),
            api_host: None,
            api_host_header: "x-rapidapi-host".to_string(),
            routes: BTreeMap::new(),
        }
    }
}

impl UpstreamConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn effective_api_host(&self) -> Option<&str> {
        self.api_host
            .as_deref()
            .or_else(|| self.provider.default_api_host())
    }

    pub fn auth(&self) -> UpstreamAuth {
        UpstreamAuth {
            api_key: self.api_key.clone(),
            api_key_header: self.api_key_header.clone(),
            api_host: self.effective_api_host().map(str::to_string),
            api_host_header: self.api_host_header.clone(),
        }
    }

    /// Provider defaults with the configured overrides applied.
    ///
    /// Unknown operation names are skipped; validation reports them.
    pub fn route_table(&self) -> RouteTable {
        let overrides = self
            .routes
            .iter()
            .filter_map(|(name, route)| Some((name.parse::<Operation>().ok()?, route.clone())));
        RouteTable::for_provider(self.provider, self.auth()).with_overrides(overrides)
    }
}

// Keeps the key out of startup logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("api_host", &self.api_host)
            .field("api_host_header", &self.api_host_header)
            .field("routes", &self.routes)
            .finish()
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Single allowed origin, or "*" for any.
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
        }
    }
}

/// Timeout configuration.
///
/// `upstream_secs` must stay below `request_secs` so a stalled upstream is
/// reported as a relay error before the inbound timeout cuts the request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed to answer an inbound request, in seconds.
    pub request_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for one upstream call, in seconds.
    pub upstream_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
            upstream_secs: 25,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_mail_tm() {
        let config = RelayConfig::default();
        assert_eq!(config.upstream.provider, Provider::MailTm);
        assert_eq!(config.upstream.effective_base_url(), "https://api.mail.tm");
        assert_eq!(config.upstream.effective_api_host(), None);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_privatix_defaults_fill_host() {
        let upstream = UpstreamConfig {
            provider: Provider::Privatix,
            ..UpstreamConfig::default()
        };
        assert_eq!(
            upstream.effective_api_host(),
            Some("privatix-temp-mail-v1.p.rapidapi.com")
        );
        assert_eq!(upstream.auth().api_host_header, "x-rapidapi-host");
    }

    #[test]
    fn test_route_table_applies_overrides() {
        use crate::upstream::{AuthScheme, UpstreamMethod};

        let mut upstream = UpstreamConfig::default();
        upstream.routes.insert(
            "list_domains".into(),
            RouteSpec::new(UpstreamMethod::Get, "/v2/domains", AuthScheme::None),
        );
        upstream.routes.insert(
            "bogus".into(),
            RouteSpec::new(UpstreamMethod::Get, "/bogus", AuthScheme::None),
        );

        let table = upstream.route_table();
        assert_eq!(table.get(Operation::ListDomains).unwrap().path, "/v2/domains");
        assert_eq!(table.get(Operation::IssueToken).unwrap().path, "/token");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let upstream = UpstreamConfig {
            api_key: Some("super-secret".into()),
            ..UpstreamConfig::default()
        };
        let printed = format!("{upstream:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
