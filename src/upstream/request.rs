//! Outbound request description.
//!
//! # Responsibilities
//! - Describe one upstream call (method, path, headers, body)
//! - Substitute path placeholders from caller-supplied parameters
//! - Reject parameter values that would change the path shape

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::upstream::error::RelayError;
use crate::upstream::routes::Operation;

/// HTTP methods the upstream providers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpstreamMethod {
    Get,
    Post,
    Delete,
}

impl UpstreamMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            UpstreamMethod::Get => reqwest::Method::GET,
            UpstreamMethod::Post => reqwest::Method::POST,
            UpstreamMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UpstreamMethod::Get => "GET",
            UpstreamMethod::Post => "POST",
            UpstreamMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A fully resolved upstream call.
///
/// Built with the consuming methods below and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequestSpec {
    operation: Operation,
    method: UpstreamMethod,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl UpstreamRequestSpec {
    pub fn new(operation: Operation, method: UpstreamMethod, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header. Later values for the same name replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn method(&self) -> UpstreamMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Names of the `{placeholder}` segments in a template, in order.
pub fn placeholders(template: &str) -> Result<Vec<&str>, RelayError> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            RelayError::Validation(format!("Malformed path template '{template}'"))
        })?;
        let name = &after[..end];
        if name.is_empty() || name.contains('{') {
            return Err(RelayError::Validation(format!(
                "Malformed path template '{template}'"
            )));
        }
        names.push(name);
        rest = &after[end + 1..];
    }
    if rest.contains('}') {
        return Err(RelayError::Validation(format!(
            "Malformed path template '{template}'"
        )));
    }
    Ok(names)
}

/// Substitute every placeholder in `template` from `params`.
pub fn resolve_path(template: &str, params: &[(&str, &str)]) -> Result<String, RelayError> {
    let mut resolved = template.to_string();
    for name in placeholders(template)? {
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                RelayError::Validation(format!("Missing required parameter '{name}'"))
            })?;
        if !is_single_segment(value) {
            return Err(RelayError::Validation(format!(
                "Invalid value for parameter '{name}'"
            )));
        }
        resolved = resolved.replacen(&format!("{{{name}}}"), value, 1);
    }
    Ok(resolved)
}

/// A value that stays one literal path segment after URL resolution.
///
/// Dot segments are normalized away by the URL parser, `%` would be read as
/// an escape and a backslash is a separator for http URLs.
fn is_single_segment(value: &str) -> bool {
    value != "."
        && value != ".."
        && !value.contains(['/', '\\', '?', '#', '%', '{', '}'])
        && !value.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_substitutes_all_placeholders() {
        let path = resolve_path(
            "/messages/{id}/attachment/{attachment_id}",
            &[("id", "abc"), ("attachment_id", "ATTACH0001")],
        )
        .unwrap();
        assert_eq!(path, "/messages/abc/attachment/ATTACH0001");
    }

    #[test]
    fn test_resolve_without_placeholders_is_identity() {
        assert_eq!(resolve_path("/domains", &[]).unwrap(), "/domains");
    }

    #[test]
    fn test_missing_parameter_is_validation_error() {
        let err = resolve_path("/request/mail/id/{mailbox}/", &[]).unwrap_err();
        assert_eq!(
            err,
            RelayError::Validation("Missing required parameter 'mailbox'".into())
        );

        let err = resolve_path("/messages/{id}", &[("id", "  ")]).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn test_values_cannot_escape_segment() {
        for bad in [
            "../admin", "a?b=c", "x#frag", "..", ".", "%2E%2E", "%2F", "a\\b", "a\nb",
        ] {
            let err = resolve_path("/messages/{id}", &[("id", bad)]).unwrap_err();
            assert!(matches!(err, RelayError::Validation(_)), "value {bad}");
        }
    }

    #[test]
    fn test_dotted_ids_inside_a_segment_are_kept() {
        let path = resolve_path("/request/one_mail/id/{id}/", &[("id", "a..b.c")]).unwrap();
        assert_eq!(path, "/request/one_mail/id/a..b.c/");
    }

    #[test]
    fn test_malformed_templates_are_rejected() {
        assert!(placeholders("/messages/{id").is_err());
        assert!(placeholders("/messages/{}").is_err());
        assert!(placeholders("/messages/id}").is_err());
        assert_eq!(placeholders("/a/{x}/b/{y}/").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_header_replaces_same_name() {
        let spec = UpstreamRequestSpec::new(Operation::ListMessages, UpstreamMethod::Get, "/messages")
            .bearer("one")
            .header("authorization", "Bearer two");
        assert_eq!(spec.headers().len(), 1);
        assert_eq!(spec.headers()[0].1, "Bearer two");
    }
}
