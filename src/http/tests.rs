use super::*;
use crate::config::Environment;
use crate::error::{ErrorCategory, ErrorKind};
use crate::test_support::{spawn_backend, test_client, test_config, unreachable_backend, SeenAuth};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock backend
// ============================================================================

async fn whoami(State(seen): State<SeenAuth>, headers: HeaderMap) -> Json<Value> {
    seen.record(&headers);
    Json(json!({"success": true, "data": {"ok": true}}))
}

async fn fail_with(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(code).unwrap(),
        Json(json!({"success": false, "message": format!("failed with {}", code)})),
    )
}

async fn fail_without_message(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

async fn plain_text() -> &'static str {
    "plain pong"
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({"success": true, "data": params}))
}

async fn echo_body(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "success": true,
        "data": {
            "body": body,
            "contentType": header("content-type"),
            "requestId": header("x-request-id"),
        }
    }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"success": true, "data": null}))
}

async fn mock_backend() -> (String, SeenAuth) {
    let seen = SeenAuth::default();
    let router = Router::new()
        .route("/api/whoami", get(whoami))
        .route("/api/fail/:code", get(fail_with))
        .route("/api/bare/:code", get(fail_without_message))
        .route("/api/text", get(plain_text))
        .route("/api/query", get(echo_query))
        .route("/api/echo", post(echo_body))
        .route("/api/slow", get(slow))
        .with_state(seen.clone());
    let base = spawn_backend(router).await;
    (format!("{}/api", base), seen)
}

// ============================================================================
// Authorization header
// ============================================================================

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let (base, seen) = mock_backend().await;
    let client = test_client(&base);

    let _: Value = client.get("/whoami").await.unwrap();
    assert_eq!(seen.last(), Some(None));
}

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let (base, seen) = mock_backend().await;
    let client = test_client(&base);

    client.set_token("t1").await;
    let _: Value = client.get("/whoami").await.unwrap();
    assert_eq!(seen.last(), Some(Some("Bearer t1".to_string())));

    // Clones share the token slot
    let other = client.clone();
    other.set_token("t2").await;
    let _: Value = client.get("/whoami").await.unwrap();
    assert_eq!(seen.last(), Some(Some("Bearer t2".to_string())));

    client.clear_token().await;
    let _: Value = other.get("/whoami").await.unwrap();
    assert_eq!(seen.last(), Some(None));
    assert_eq!(seen.all().len(), 3);
}

// ============================================================================
// Response handling
// ============================================================================

#[tokio::test]
async fn test_envelope_data_is_returned() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let data: Value = client.get("whoami").await.unwrap();
    assert_eq!(data, json!({"ok": true}));
}

#[tokio::test]
async fn test_non_2xx_status_is_preserved() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    for code in [400u16, 401, 403, 404, 409, 422, 500, 502, 503] {
        let err = client
            .get::<Value>(&format!("/fail/{}", code))
            .await
            .unwrap_err();
        assert_eq!(err.http_status, Some(code));
        assert_eq!(err.message, format!("failed with {}", code));
        assert_eq!(err.kind(), ErrorKind::Http);
    }
}

#[tokio::test]
async fn test_generic_message_when_body_has_none() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let err = client.get::<Value>("/bare/503").await.unwrap_err();
    assert_eq!(err.http_status, Some(503));
    assert_eq!(err.message, "HTTP error! status: 503");
    assert_eq!(err.category(), ErrorCategory::Server);
}

#[tokio::test]
async fn test_text_responses_are_returned_raw() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let response = client
        .send(Method::GET, "/text", None, RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(response.body, ResponseBody::Text("plain pong".to_string()));

    let text: String = client.get("/text").await.unwrap();
    assert_eq!(text, "plain pong");
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let options = RequestOptions::new()
        .query(&json!({"search": "mardi himal", "page": 2, "location": null}))
        .unwrap();
    let echoed: HashMap<String, String> = client.get_with("/query", options).await.unwrap();

    assert_eq!(echoed.get("search").map(String::as_str), Some("mardi himal"));
    assert_eq!(echoed.get("page").map(String::as_str), Some("2"));
    assert!(!echoed.contains_key("location"));
}

#[tokio::test]
async fn test_json_body_and_default_headers() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let echoed: Value = client
        .post("/echo", &json!({"trekId": "t1", "participants": 2}))
        .await
        .unwrap();

    assert_eq!(echoed["body"], json!({"trekId": "t1", "participants": 2}));
    assert_eq!(echoed["contentType"], "application/json");
    let request_id = echoed["requestId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

// ============================================================================
// Transport failures, timeouts and cancellation
// ============================================================================

#[tokio::test]
async fn test_connection_failure_in_development_hints_at_local_server() {
    let base = unreachable_backend().await;
    let client = test_client(&base);

    let err = client.get::<Value>("/treks").await.unwrap_err();
    assert_eq!(err.http_status, None);
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.message.contains("backend server is running"), "{}", err.message);
}

#[tokio::test]
async fn test_connection_failure_in_production_is_generic() {
    let base = unreachable_backend().await;
    let config = test_config(&base).with_environment(Environment::Production);
    let client = HttpClient::new(&config).unwrap();

    let err = client.get::<Value>("/treks").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.message.starts_with("Unable to connect to the server"));
}

#[tokio::test]
async fn test_timeout_is_enforced() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let options = RequestOptions::new().timeout(Duration::from_millis(100));
    let err = client.get_with::<Value>("/slow", options).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn test_cancellation_aborts_pending_request() {
    let (base, _) = mock_backend().await;
    let client = test_client(&base);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let options = RequestOptions::new().without_timeout().cancel_on(cancel);
    let err = client.get_with::<Value>("/slow", options).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn test_already_cancelled_request_is_not_sent() {
    let (base, seen) = mock_backend().await;
    let client = test_client(&base);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = client
        .get_with::<Value>("/whoami", RequestOptions::new().cancel_on(cancel))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(seen.all().is_empty());
}

#[test]
fn test_endpoint_url_keeps_base_path() {
    let client = test_client("http://localhost:5000/api/");
    assert_eq!(
        client.endpoint_url("/treks/42").unwrap().as_str(),
        "http://localhost:5000/api/treks/42"
    );
    assert_eq!(
        client.endpoint_url("auth/me").unwrap().as_str(),
        "http://localhost:5000/api/auth/me"
    );
}
