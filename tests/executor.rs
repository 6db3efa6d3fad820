//! Executor behaviour against a live programmable upstream.

use std::time::{Duration, Instant};

use ephemail_relay::upstream::{
    HttpExecutor, Operation, Provider, RouteTable, UpstreamAuth, UpstreamExecutor, UpstreamMethod,
    UpstreamRequestSpec,
};
use serde_json::{json, Value};
use url::Url;

mod common;

fn executor(base: &str) -> HttpExecutor {
    executor_with_timeout(base, Duration::from_secs(25))
}

fn executor_with_timeout(base: &str, timeout: Duration) -> HttpExecutor {
    HttpExecutor::new(Url::parse(base).unwrap(), Duration::from_secs(5), timeout).unwrap()
}

fn list_messages(token: &str) -> UpstreamRequestSpec {
    UpstreamRequestSpec::new(Operation::ListMessages, UpstreamMethod::Get, "/messages").bearer(token)
}

#[tokio::test]
async fn test_success_passes_body_through_unchanged() {
    let body = json!({
        "hydra:member": [
            {"id": "m1", "from": {"address": "a@b.c"}, "subject": "Hi", "seen": false}
        ],
        "hydra:totalItems": 1,
        "@context": "/contexts/Message"
    });
    let upstream = common::start_programmable_backend({
        let body = body.to_string();
        move |_| (200, body.clone())
    })
    .await;

    let result = executor(&upstream.url()).execute(&list_messages("tok")).await;

    assert!(result.success);
    assert_eq!(result.status_code, 200);
    assert_eq!(result.payload, body);
}

#[tokio::test]
async fn test_success_status_is_mirrored() {
    let upstream = common::start_mock_backend(201, r#"{"id":"acc-1","address":"x@y.z"}"#).await;
    let spec = UpstreamRequestSpec::new(Operation::CreateAccount, UpstreamMethod::Post, "/accounts")
        .json(json!({"address": "x@y.z", "password": "pw"}));

    let result = executor(&upstream.url()).execute(&spec).await;

    assert!(result.success);
    assert_eq!(result.status_code, 201);
    assert_eq!(result.payload["id"], "acc-1");
}

#[tokio::test]
async fn test_empty_body_decodes_to_null() {
    let upstream = common::start_mock_backend(204, "").await;
    let spec = UpstreamRequestSpec::new(Operation::DeleteMessage, UpstreamMethod::Delete, "/messages/m1")
        .bearer("tok");

    let result = executor(&upstream.url()).execute(&spec).await;

    assert!(result.success);
    assert_eq!(result.payload, Value::Null);
}

#[tokio::test]
async fn test_upstream_client_error_keeps_code_and_body() {
    let upstream =
        common::start_mock_backend(401, r#"{"code":401,"message":"Invalid credentials."}"#).await;
    let spec = UpstreamRequestSpec::new(Operation::IssueToken, UpstreamMethod::Post, "/token")
        .json(json!({"address": "x@y.z", "password": "wrong"}));

    let result = executor(&upstream.url()).execute(&spec).await;

    assert!(!result.success);
    assert_eq!(result.status_code, 401);
    assert_eq!(
        result.payload["message"],
        "Error authenticating: Invalid credentials."
    );
    assert_eq!(result.payload["upstream"]["code"], 401);
}

#[tokio::test]
async fn test_upstream_server_error_maps_to_500() {
    let upstream = common::start_mock_backend(503, "Service Unavailable").await;

    let result = executor(&upstream.url()).execute(&list_messages("tok")).await;

    assert!(!result.success);
    assert_eq!(result.status_code, 500);
    assert_eq!(result.payload["upstream"], "Service Unavailable");
    assert_eq!(
        result.payload["message"],
        "Error fetching messages: Service Unavailable"
    );
}

#[tokio::test]
async fn test_connection_refused_is_500() {
    let addr = common::unused_addr().await;

    let result = executor(&format!("http://{addr}")).execute(&list_messages("tok")).await;

    assert!(!result.success);
    assert_eq!(result.status_code, 500);
    let message = result.payload["message"].as_str().unwrap();
    assert!(message.starts_with("Error fetching messages: "), "{message}");
    assert!(result.payload.get("upstream").is_none());
}

#[tokio::test]
async fn test_silent_upstream_times_out_as_transport_error() {
    let addr = common::start_silent_backend().await;
    let exec = executor_with_timeout(&format!("http://{addr}"), Duration::from_millis(300));

    let start = Instant::now();
    let result = exec.execute(&list_messages("tok")).await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!result.success);
    assert_eq!(result.status_code, 500);
    assert_eq!(
        result.payload["message"],
        "Error fetching messages: upstream request timed out"
    );
}

#[tokio::test]
async fn test_method_path_headers_and_body_are_forwarded() {
    let upstream = common::start_mock_backend(200, r#"{"token":"t"}"#).await;
    let spec = UpstreamRequestSpec::new(Operation::IssueToken, UpstreamMethod::Post, "/token")
        .header("x-custom", "1")
        .json(json!({"address": "x@y.z", "password": "pw"}));

    executor(&upstream.url()).execute(&spec).await;

    let seen = upstream.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/token");
    assert_eq!(seen[0].header("x-custom"), Some("1"));
    assert_eq!(seen[0].json(), json!({"address": "x@y.z", "password": "pw"}));
}

#[tokio::test]
async fn test_api_key_route_sends_key_headers() {
    let upstream = common::start_mock_backend(200, r#"["@mailto.plus","@fexpost.com"]"#).await;
    let table = RouteTable::for_provider(
        Provider::Privatix,
        UpstreamAuth {
            api_key: Some("test-key".into()),
            api_key_header: "x-rapidapi-key".into(),
            api_host: Some("privatix-temp-mail-v1.p.rapidapi.com".into()),
            api_host_header: "x-rapidapi-host".into(),
        },
    );
    let spec = table.request(Operation::ListDomains, &[], None).unwrap();

    let result = executor(&upstream.url()).execute(&spec).await;

    assert!(result.success);
    let seen = upstream.requests();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/request/domains/");
    assert_eq!(seen[0].header("x-rapidapi-key"), Some("test-key"));
    assert_eq!(
        seen[0].header("x-rapidapi-host"),
        Some("privatix-temp-mail-v1.p.rapidapi.com")
    );
}

#[tokio::test]
async fn test_same_spec_twice_gives_identical_results() {
    let upstream = common::start_mock_backend(200, r#"{"hydra:member":[],"hydra:totalItems":0}"#).await;
    let exec = executor(&upstream.url());
    let spec = list_messages("tok");

    let first = exec.execute(&spec).await;
    let second = exec.execute(&spec).await;

    assert_eq!(first, second);
    assert_eq!(upstream.requests().len(), 2);
}
