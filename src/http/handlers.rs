//! Relay route handlers.
//!
//! Each handler checks its inputs, builds one UpstreamRequestSpec from the
//! route table, runs it through the executor and shapes the response. No
//! other logic lives here.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::credentials::generate_credentials;
use crate::http::request::{bearer_from_headers, json_body, required};
use crate::http::response::{extract_collection, failure, success};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::upstream::{Operation, ProxyResult, RelayError};

#[derive(Debug, Default, Deserialize)]
pub struct CreateAccountBody {
    pub domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthenticateBody {
    pub address: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchMessagesBody {
    pub token: Option<String>,
    pub mailbox: Option<String>,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.routes.provider().to_string(),
    }))
}

/// `GET /domains`
pub async fn list_domains(State(state): State<AppState>) -> Result<Response, RelayError> {
    let spec = checked(state.routes.request(Operation::ListDomains, &[], None))?;
    let result = state.executor.execute(&spec).await;
    if !result.success {
        return Ok(failure(result));
    }
    Ok(success(json!({ "domains": extract_collection(result.payload) })))
}

/// `POST /create-account`
///
/// Generates an address on the requested domain and registers it upstream.
pub async fn create_account(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let input: CreateAccountBody = checked(json_body(&body))?;
    let domain = checked(required(
        input.domain,
        "Domain is required to create an account",
    ))?;

    let credentials = generate_credentials(&domain);
    let spec = checked(state.routes.request(Operation::CreateAccount, &[], None))?.json(json!({
        "address": credentials.address,
        "password": credentials.password,
    }));

    let result = state.executor.execute(&spec).await;
    if !result.success {
        return Ok(failure(result));
    }

    tracing::info!(address = %credentials.address, "Account created");
    Ok(success(json!({
        "address": credentials.address,
        "password": credentials.password,
        "data": result.payload,
    })))
}

/// `POST /authenticate`
pub async fn authenticate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let input: AuthenticateBody = checked(json_body(&body))?;
    let (address, password) = match (input.address, input.password) {
        (Some(a), Some(p)) if !a.trim().is_empty() && !p.is_empty() => (a.trim().to_string(), p),
        _ => {
            return Err(reject(RelayError::Validation(
                "Email and password are required".to_string(),
            )))
        }
    };

    let spec = checked(state.routes.request(Operation::IssueToken, &[], None))?
        .json(json!({ "address": address, "password": password }));
    let result = state.executor.execute(&spec).await;
    if !result.success {
        tracing::warn!(address = %address, status = result.status_code, "Authentication failed");
        return Ok(failure(result));
    }

    let token = result
        .payload
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            RelayError::Unauthorized("Authentication failed: no token issued".to_string())
        })?;

    Ok(success(json!({
        "token": token,
        "data": result.payload,
    })))
}

/// `POST /fetch-messages`
///
/// The token may come from the body or an `Authorization: Bearer` header.
pub async fn fetch_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let input: FetchMessagesBody = checked(json_body(&body))?;
    let token = input
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_from_headers(&headers));
    let mailbox = input.mailbox.unwrap_or_default();

    let spec = checked(state.routes.request(
        Operation::ListMessages,
        &[("mailbox", mailbox.as_str())],
        token.as_deref(),
    ))?;
    let result = state.executor.execute(&spec).await;
    if !result.success {
        return Ok(failure(result));
    }
    Ok(success(json!({ "messages": extract_collection(result.payload) })))
}

/// `GET /messages/{id}`
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let result = forward(&state, Operation::GetMessage, &[("id", id.as_str())], &headers).await?;
    if !result.success {
        return Ok(failure(result));
    }
    Ok(success(json!({ "data": result.payload })))
}

/// `DELETE /messages/{id}`
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let result = forward(&state, Operation::DeleteMessage, &[("id", id.as_str())], &headers).await?;
    if !result.success {
        return Ok(failure(result));
    }
    tracing::info!(message_id = %id, "Email deleted");
    Ok(success(json!({
        "message": "Email deleted successfully.",
        "data": result.payload,
    })))
}

/// `GET /messages/{id}/attachments`
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let result = forward(&state, Operation::ListAttachments, &[("id", id.as_str())], &headers).await?;
    if !result.success {
        return Ok(failure(result));
    }
    Ok(success(json!({ "attachments": extract_collection(result.payload) })))
}

/// `GET /messages/{id}/attachments/{attachment_id}`
pub async fn get_attachment(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let params = [("id", id.as_str()), ("attachment_id", attachment_id.as_str())];
    let result = forward(&state, Operation::GetAttachment, &params, &headers).await?;
    if !result.success {
        return Ok(failure(result));
    }
    Ok(success(json!({ "data": result.payload })))
}

/// Build and execute a request whose only credential is the bearer header.
async fn forward(
    state: &AppState,
    operation: Operation,
    params: &[(&str, &str)],
    headers: &HeaderMap,
) -> Result<ProxyResult, RelayError> {
    let token = bearer_from_headers(headers);
    let spec = checked(state.routes.request(operation, params, token.as_deref()))?;
    Ok(state.executor.execute(&spec).await)
}

/// Count requests turned away before reaching the upstream.
fn checked<T>(result: Result<T, RelayError>) -> Result<T, RelayError> {
    result.map_err(reject)
}

fn reject(err: RelayError) -> RelayError {
    let reason = match err {
        RelayError::Unsupported(_) => "unsupported",
        _ => "validation",
    };
    metrics::record_rejection(reason);
    tracing::debug!(error = %err, "Request rejected");
    err
}
