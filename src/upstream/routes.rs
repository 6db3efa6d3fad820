//! Operation → upstream route table.
//!
//! # Responsibilities
//! - Name the operations the relay exposes
//! - Hold the per-provider method, path template and auth scheme
//! - Build an UpstreamRequestSpec with the right credentials attached
//!
//! # Design Decisions
//! - Each provider ships a default table; config may override single entries
//! - Operations missing from the table are reported, not guessed

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::upstream::error::RelayError;
use crate::upstream::request::{resolve_path, UpstreamMethod, UpstreamRequestSpec};

/// Relay operations, one per local endpoint that reaches the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListDomains,
    CreateAccount,
    IssueToken,
    ListMessages,
    GetMessage,
    DeleteMessage,
    ListAttachments,
    GetAttachment,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::ListDomains,
        Operation::CreateAccount,
        Operation::IssueToken,
        Operation::ListMessages,
        Operation::GetMessage,
        Operation::DeleteMessage,
        Operation::ListAttachments,
        Operation::GetAttachment,
    ];

    /// Config and metrics key.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListDomains => "list_domains",
            Operation::CreateAccount => "create_account",
            Operation::IssueToken => "issue_token",
            Operation::ListMessages => "list_messages",
            Operation::GetMessage => "get_message",
            Operation::DeleteMessage => "delete_message",
            Operation::ListAttachments => "list_attachments",
            Operation::GetAttachment => "get_attachment",
        }
    }

    /// Phrase used in "Error <label>: ..." messages.
    pub fn label(self) -> &'static str {
        match self {
            Operation::ListDomains => "listing domains",
            Operation::CreateAccount => "creating account",
            Operation::IssueToken => "authenticating",
            Operation::ListMessages => "fetching messages",
            Operation::GetMessage => "fetching message",
            Operation::DeleteMessage => "deleting email",
            Operation::ListAttachments => "fetching attachments",
            Operation::GetAttachment => "fetching attachment",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation '{s}'"))
    }
}

/// Supported temporary-mailbox providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// mail.tm: accounts plus bearer tokens.
    #[default]
    MailTm,
    /// Privatix Temp Mail on RapidAPI: static API key headers.
    Privatix,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::MailTm => "https://api.mail.tm",
            Provider::Privatix => "https://privatix-temp-mail-v1.p.rapidapi.com",
        }
    }

    pub fn default_api_host(self) -> Option<&'static str> {
        match self {
            Provider::MailTm => None,
            Provider::Privatix => Some("privatix-temp-mail-v1.p.rapidapi.com"),
        }
    }

    fn default_routes(self) -> Vec<(Operation, RouteSpec)> {
        use AuthScheme::{ApiKey, Bearer};
        use UpstreamMethod::{Delete, Get, Post};

        match self {
            Provider::MailTm => vec![
                (Operation::ListDomains, RouteSpec::new(Get, "/domains", AuthScheme::None)),
                (Operation::CreateAccount, RouteSpec::new(Post, "/accounts", AuthScheme::None)),
                (Operation::IssueToken, RouteSpec::new(Post, "/token", AuthScheme::None)),
                (Operation::ListMessages, RouteSpec::new(Get, "/messages", Bearer)),
                (Operation::GetMessage, RouteSpec::new(Get, "/messages/{id}", Bearer)),
                (Operation::DeleteMessage, RouteSpec::new(Delete, "/messages/{id}", Bearer)),
                (
                    Operation::GetAttachment,
                    RouteSpec::new(Get, "/messages/{id}/attachment/{attachment_id}", Bearer),
                ),
            ],
            Provider::Privatix => vec![
                (Operation::ListDomains, RouteSpec::new(Get, "/request/domains/", ApiKey)),
                (Operation::ListMessages, RouteSpec::new(Get, "/request/mail/id/{mailbox}/", ApiKey)),
                (Operation::GetMessage, RouteSpec::new(Get, "/request/one_mail/id/{id}/", ApiKey)),
                (Operation::DeleteMessage, RouteSpec::new(Get, "/request/delete/id/{id}/", ApiKey)),
                (Operation::ListAttachments, RouteSpec::new(Get, "/request/attachments/id/{id}/", ApiKey)),
                (
                    Operation::GetAttachment,
                    RouteSpec::new(Get, "/request/one_attachment/id/{id}/{attachment_id}/", ApiKey),
                ),
            ],
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::MailTm => f.write_str("mail_tm"),
            Provider::Privatix => f.write_str("privatix"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mail_tm" | "mailtm" | "mail.tm" => Ok(Provider::MailTm),
            "privatix" => Ok(Provider::Privatix),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// How a route authenticates to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    #[default]
    None,
    /// Caller-supplied token, forwarded as `Authorization: Bearer`.
    Bearer,
    /// Static key pair from configuration.
    ApiKey,
}

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub method: UpstreamMethod,
    pub path: String,
    #[serde(default)]
    pub auth: AuthScheme,
}

impl RouteSpec {
    pub fn new(method: UpstreamMethod, path: impl Into<String>, auth: AuthScheme) -> Self {
        Self {
            method,
            path: path.into(),
            auth,
        }
    }
}

/// Static API key headers for `AuthScheme::ApiKey` routes.
#[derive(Clone, Default)]
pub struct UpstreamAuth {
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub api_host: Option<String>,
    pub api_host_header: String,
}

impl std::fmt::Debug for UpstreamAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamAuth")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("api_host", &self.api_host)
            .field("api_host_header", &self.api_host_header)
            .finish()
    }
}

/// Route table for the configured provider.
#[derive(Debug, Clone)]
pub struct RouteTable {
    provider: Provider,
    routes: HashMap<Operation, RouteSpec>,
    auth: UpstreamAuth,
}

impl RouteTable {
    /// Default table for a provider.
    pub fn for_provider(provider: Provider, auth: UpstreamAuth) -> Self {
        Self {
            provider,
            routes: provider.default_routes().into_iter().collect(),
            auth,
        }
    }

    /// Replace or add single entries.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (Operation, RouteSpec)>,
    {
        for (operation, route) in overrides {
            self.routes.insert(operation, route);
        }
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn get(&self, operation: Operation) -> Result<&RouteSpec, RelayError> {
        self.routes
            .get(&operation)
            .ok_or(RelayError::Unsupported(operation))
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.routes.contains_key(&operation)
    }

    /// Build the request for `operation`.
    ///
    /// `bearer` is only consulted for bearer routes and is required there.
    pub fn request(
        &self,
        operation: Operation,
        params: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<UpstreamRequestSpec, RelayError> {
        let route = self.get(operation)?;
        let path = resolve_path(&route.path, params)?;
        let spec = UpstreamRequestSpec::new(operation, route.method, path)
            .header("Accept", "application/json");

        match route.auth {
            AuthScheme::None => Ok(spec),
            AuthScheme::Bearer => {
                let token = bearer
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        RelayError::Validation(format!(
                            "Token is required for {}",
                            operation.label()
                        ))
                    })?;
                Ok(spec.bearer(token))
            }
            AuthScheme::ApiKey => {
                let mut spec = spec;
                // A missing key is left for the upstream to reject.
                if let Some(key) = &self.auth.api_key {
                    spec = spec.header(self.auth.api_key_header.clone(), key.clone());
                }
                if let Some(host) = &self.auth.api_host {
                    spec = spec.header(self.auth.api_host_header.clone(), host.clone());
                }
                Ok(spec)
            }
        }
    }
}
