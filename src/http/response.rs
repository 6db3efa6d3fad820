//! Response shaping.
//!
//! # Responsibilities
//! - Wrap successful results in the `{status: true, ...}` envelope
//! - Emit failed ProxyResults with their mapped status and payload
//! - Extract collections from the providers' response shapes
//!
//! # Design Decisions
//! - Local success is always 200; upstream 201/204 are not mirrored
//! - An empty or absent upstream collection is an empty list, never an error

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::upstream::ProxyResult;

const HYDRA_MEMBER: &str = "hydra:member";

/// 200 with the fields of `fields` plus `"status": true`.
///
/// A non-object argument is placed under `data`.
pub fn success(fields: Value) -> Response {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::Bool(true));
    match fields {
        Value::Object(map) => body.extend(map),
        other => {
            body.insert("data".to_string(), other);
        }
    }
    (StatusCode::OK, Json(Value::Object(body))).into_response()
}

/// A failed ProxyResult as an HTTP response, payload verbatim plus `"status": false`.
pub fn failure(result: ProxyResult) -> Response {
    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = match result.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("message".to_string(), other);
            map
        }
    };
    body.insert("status".to_string(), Value::Bool(false));
    (status, Json(Value::Object(body))).into_response()
}

/// The list inside a provider response.
///
/// mail.tm wraps lists in a Hydra envelope; Privatix returns bare arrays or,
/// for an empty mailbox, an object carrying only an error string.
pub fn extract_collection(payload: Value) -> Value {
    match payload {
        Value::Array(_) => payload,
        Value::Object(mut map) => match map.remove(HYDRA_MEMBER) {
            Some(members @ Value::Array(_)) => members,
            _ => Value::Array(Vec::new()),
        },
        _ => Value::Array(Vec::new()),
    }
}
