//! Mock server routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::CorsConfig;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::server::cors_layer;
use crate::mock::session::{SessionStore, X_SESSION_ID};

const TEST_MESSAGES: [&str; 2] = ["Test Message 1", "Test Message 2"];

/// Build the mock router around `store`.
pub fn mock_router(store: SessionStore, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/create-account", post(create_account))
        .route("/me", get(me))
        .route("/messages", get(messages))
        .route("/delete-account", delete(delete_account))
        .with_state(store)
        .layer(cors_layer(cors))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(set_request_id_layer())
}

/// `POST /create-account`
async fn create_account(State(store): State<SessionStore>) -> Response {
    let (id, account) = store.create();
    tracing::info!(session_id = %id, username = %account.username, "Mock account created");
    Json(json!({
        "status": true,
        "data": {
            "session_id": id,
            "username": account.username,
        },
    }))
    .into_response()
}

/// `GET /me`
async fn me(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let id = match session_id(&headers) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match store.get(&id) {
        Some(account) => Json(json!({ "status": true, "data": account })).into_response(),
        None => not_found("Account not found."),
    }
}

/// `GET /messages`
async fn messages(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let id = match session_id(&headers) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if store.get(&id).is_none() {
        return not_found("No messages available.");
    }
    Json(json!({ "status": true, "messages": TEST_MESSAGES })).into_response()
}

/// `DELETE /delete-account`
async fn delete_account(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let id = match session_id(&headers) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if store.remove(&id) {
        tracing::info!(session_id = %id, "Mock account deleted");
    }
    Json(json!({ "status": true, "message": "Account deleted successfully." })).into_response()
}

fn session_id(headers: &HeaderMap) -> Result<Uuid, Response> {
    let raw = headers
        .get(X_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| bad_request("Missing x-session-id header"))?;
    Uuid::parse_str(raw.trim()).map_err(|_| bad_request("Invalid x-session-id header"))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": false, "message": message })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": false, "message": message })),
    )
        .into_response()
}
