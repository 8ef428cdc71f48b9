//! `/process` と `/health` のIntegration Tests

use crate::support::gate::{
    bearer, process_request, process_request_from, token_with_exp, TestGate, TEST_API_KEY,
    TEST_PORT,
};
use auditgate::audit::Outcome;
use auditgate::common::error::DispatchError;
use auditgate::dispatch::dispatch;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceExt;

fn unauthenticated(builder: axum::http::request::Builder) -> Request<Body> {
    builder
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"dataset_id": "ds1", "action": "count", "payload": {}}).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_health_requires_no_auth_and_is_not_logged() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "process-api", "port": TEST_PORT})
    );
    assert!(gate.file_records().is_empty());
    assert!(gate.store_records().await.is_empty());
}

#[tokio::test]
async fn test_missing_credentials_rejected_without_record() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(unauthenticated(Request::builder().uri("/process")))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].as_str().unwrap().contains("API key required"));
    assert!(gate.file_records().is_empty());
    assert!(gate.store_records().await.is_empty());
}

#[tokio::test]
async fn test_wrong_api_key_rejected() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(unauthenticated(
            Request::builder()
                .uri("/process")
                .header("X-API-Key", "wrong")
                .header(header::AUTHORIZATION, bearer()),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid API key");
    assert!(gate.store_records().await.is_empty());
}

#[tokio::test]
async fn test_expired_token_detail_differs_from_invalid_token() {
    let gate = TestGate::new().await;

    let expired = format!("Bearer {}", token_with_exp(-60));
    let (status, expired_body) = gate
        .send(unauthenticated(
            Request::builder()
                .uri("/process")
                .header("X-API-Key", TEST_API_KEY)
                .header(header::AUTHORIZATION, expired),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired_body["detail"], "JWT token has expired");

    let (status, invalid_body) = gate
        .send(unauthenticated(
            Request::builder()
                .uri("/process")
                .header("X-API-Key", TEST_API_KEY)
                .header(header::AUTHORIZATION, "Bearer not.a.jwt"),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(invalid_body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JWT token"));

    assert_ne!(expired_body["detail"], invalid_body["detail"]);
    assert!(gate.file_records().is_empty());
}

#[tokio::test]
async fn test_query_api_key_is_accepted() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(unauthenticated(
            Request::builder()
                .uri(format!("/process?api_key={}", TEST_API_KEY))
                .header(header::AUTHORIZATION, bearer()),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"count": 0, "dataset": "ds1"}));
}

#[tokio::test]
async fn test_count_success_envelope_and_record() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(process_request(json!({
            "dataset_id": "ds1",
            "action": "count",
            "payload": {"items": [1, 2, 3]}
        })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!({"count": 3, "dataset": "ds1"}));
    let request_id = body["request_id"].as_str().unwrap().to_string();

    let file_records = gate.file_records();
    assert_eq!(file_records.len(), 1);
    assert_eq!(file_records[0].request_id.to_string(), request_id);
    assert_eq!(file_records[0].outcome, Outcome::Success);
    assert_eq!(file_records[0].http_status, 200);
    assert_eq!(file_records[0].output, json!({"count": 3, "dataset": "ds1"}));
}

#[tokio::test]
async fn test_summarize_force_fail_is_logged_failure() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(process_request(json!({
            "dataset_id": "sales",
            "action": "summarize",
            "payload": {"rows": [1, 2], "force_fail": true}
        })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("forced failure requested"));

    let file_records = gate.file_records();
    let store_records = gate.store_records().await;
    assert_eq!(file_records.len(), 1);
    assert_eq!(store_records.len(), 1);
    for record in [&file_records[0], &store_records[0]] {
        assert_eq!(record.outcome, Outcome::Failure);
        assert_eq!(record.http_status, 400);
        assert_eq!(record.action, "summarize");
        assert_eq!(record.output, json!(detail));
    }
}

#[tokio::test]
async fn test_unknown_action_is_acknowledged() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(process_request(json!({
            "dataset_id": "ds1",
            "action": "reindex",
            "payload": {"a": 1}
        })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["message"],
        "Action 'reindex' executed successfully"
    );
    assert_eq!(body["data"]["payload_keys"], json!(["a"]));
}

#[tokio::test]
async fn test_payload_keys_keep_request_order() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(process_request(json!({
            "dataset_id": "ds1",
            "action": "reindex",
            "payload": {"zeta": 1, "alpha": 2, "mid": 3}
        })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payload_keys"], json!(["zeta", "alpha", "mid"]));
}

#[tokio::test]
async fn test_malformed_body_is_rejected_before_dispatch() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(
            Request::builder()
                .method("POST")
                .uri("/process")
                .header("X-API-Key", TEST_API_KEY)
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"dataset_id": "ds1"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_detail_mentions(&body, "action"));
    assert!(gate.file_records().is_empty());
    assert!(gate.store_records().await.is_empty());
}

#[tokio::test]
async fn test_unparseable_body_uses_detail_envelope() {
    let gate = TestGate::new().await;

    let (status, body) = gate
        .send(
            Request::builder()
                .method("POST")
                .uri("/process")
                .header("X-API-Key", TEST_API_KEY)
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert!(gate.file_records().is_empty());
}

fn body_detail_mentions(body: &Value, needle: &str) -> bool {
    body["detail"]
        .as_str()
        .map(|detail| detail.contains(needle))
        .unwrap_or(false)
}

fn slow_dispatch(
    action: &str,
    dataset_id: &str,
    payload: &Map<String, Value>,
) -> Result<Value, DispatchError> {
    std::thread::sleep(Duration::from_millis(300));
    dispatch(action, dataset_id, payload)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_disconnect_still_dispatches_and_logs() {
    let gate = TestGate::with_dispatcher(slow_dispatch).await;

    let app = gate.app.clone();
    let client = tokio::spawn(async move {
        app.oneshot(process_request(json!({
            "dataset_id": "ds1",
            "action": "count",
            "payload": {"items": [1, 2]}
        })))
        .await
    });

    // ディスパッチ中にクライアント側のタスクを破棄する
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.abort();
    match client.await {
        Err(e) => assert!(e.is_cancelled()),
        Ok(_) => panic!("response arrived before the client was aborted"),
    }

    let mut logged = false;
    for _ in 0..100 {
        if gate.file_records().len() == 1 && gate.store_count().await == 1 {
            logged = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(logged, "request was not logged after disconnect");

    let records = gate.file_records();
    assert_eq!(records[0].outcome, Outcome::Success);
    assert_eq!(records[0].output, json!({"count": 2, "dataset": "ds1"}));
}

#[tokio::test]
async fn test_client_address_is_recorded_normalized() {
    let gate = TestGate::new().await;
    let addr: SocketAddr = "[::ffff:192.168.1.20]:50123".parse().unwrap();

    let (status, _) = gate
        .send(process_request_from(
            json!({"dataset_id": "ds1", "action": "validate", "payload": {}}),
            addr,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let records = gate.store_records().await;
    assert_eq!(records[0].client.as_deref(), Some("192.168.1.20"));
}
