//! REST outbound adapter integration tests against a mock HTTP server.

use mockito::Matcher;
use serde_json::json;
use switchyard::domain::models::{
    AdapterDirection, AdapterKind, AdapterState, BatchSettings, SendRequest,
};
use switchyard::{AdapterConfig, AdapterFactory, AdapterRuntime};

fn rest_config(url: String) -> AdapterConfig {
    AdapterConfig::new("api", AdapterKind::Rest, AdapterDirection::Outbound)
        .with_setting("url", json!(url))
        .with_setting("auth_token", json!("s3cr3t-token"))
}

async fn running(config: AdapterConfig) -> AdapterRuntime {
    let runtime = AdapterFactory::build(config).unwrap();
    assert!(runtime.initialize().await.is_success());
    assert!(runtime.start().await.is_success());
    runtime
}

#[tokio::test]
async fn test_send_posts_payload_with_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ingest")
        .match_header("authorization", "Bearer s3cr3t-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "order": 42 })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accepted":true}"#)
        .create_async()
        .await;

    let runtime = running(rest_config(format!("{}/ingest", server.url()))).await;
    let result = runtime.send(&SendRequest::new(json!({ "order": 42 }))).await;

    mock.assert_async().await;
    assert!(result.is_success(), "{}", result.message());
    assert!(result.message().ends_with("(HTTP 201)"));
    assert_eq!(result.data(), Some(&json!({ "accepted": true })));
    assert_eq!(result.metadata()["status"], json!(201));
    assert_eq!(result.records_processed(), Some(1));
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_server_error_is_reported_as_transient_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/ingest")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let runtime = running(rest_config(format!("{}/ingest", server.url()))).await;
    let result = runtime.send(&SendRequest::new("ping")).await;

    assert!(!result.is_success());
    assert!(result.message().contains("HTTP 503"));
    assert!(result.message().contains("maintenance"));
    assert_eq!(result.metadata()["error_kind"], json!("transient_connectivity"));
    assert_eq!(runtime.state(), AdapterState::Running);
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_rejected_credentials_are_not_echoed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/ingest")
        .with_status(401)
        .create_async()
        .await;

    let runtime = running(rest_config(format!("{}/ingest", server.url()))).await;
    let result = runtime.send(&SendRequest::new("ping")).await;

    assert!(!result.is_success());
    assert!(result.message().contains("authentication rejected"));
    assert!(!result.message().contains("s3cr3t-token"));
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_batch_is_posted_as_json_array() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bulk")
        .match_header("x-batch-number", "1")
        .match_body(Matcher::Json(json!(["a", { "id": 2 }])))
        .with_status(200)
        .create_async()
        .await;

    let config = rest_config(format!("{}/bulk", server.url())).with_batch(BatchSettings {
        enabled: true,
        size: Some(2),
        ..BatchSettings::default()
    });
    let runtime = running(config).await;

    assert_eq!(
        runtime.send(&SendRequest::new("a")).await.message(),
        "Added to batch (1/2 items)"
    );
    let flushed = runtime.send(&SendRequest::new(json!({ "id": 2 }))).await;

    mock.assert_async().await;
    assert!(flushed.is_success(), "{}", flushed.message());
    assert_eq!(flushed.records_processed(), Some(2));
    assert_eq!(flushed.metadata()["batch_number"], json!(1));
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_connection_test_probes_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let head = server
        .mock("HEAD", "/ingest")
        .with_status(200)
        .create_async()
        .await;

    let runtime = AdapterFactory::build(rest_config(format!("{}/ingest", server.url()))).unwrap();
    runtime.initialize().await;
    let result = runtime.test_connection().await;

    head.assert_async().await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.message(), "All 3 checks passed");
}

#[tokio::test]
async fn test_missing_token_fails_auth_check_when_required() {
    let mut server = mockito::Server::new_async().await;
    let _head = server
        .mock("HEAD", "/ingest")
        .with_status(200)
        .create_async()
        .await;

    let config = AdapterConfig::new("api", AdapterKind::Rest, AdapterDirection::Outbound)
        .with_setting("url", json!(format!("{}/ingest", server.url())))
        .with_setting("auth_required", json!(true));
    let runtime = AdapterFactory::build(config).unwrap();
    runtime.initialize().await;

    let result = runtime.test_connection().await;
    assert!(!result.is_success());
    assert!(result.message().starts_with("auth configured:"));
    assert_eq!(result.metadata()["checks_failed"], json!(1));
}

#[tokio::test]
async fn test_per_item_batch_reports_partial_failure() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("POST", "/items")
        .match_body("good")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let _rejected = server
        .mock("POST", "/items")
        .match_body("bad")
        .with_status(422)
        .with_body("unprocessable")
        .create_async()
        .await;

    let config = rest_config(format!("{}/items", server.url()))
        .with_setting("batch_mode", json!("per_item"))
        .with_batch(BatchSettings {
            enabled: true,
            size: Some(3),
            ..BatchSettings::default()
        });
    let runtime = running(config).await;

    runtime.send(&SendRequest::new("good")).await;
    runtime.send(&SendRequest::new("bad")).await;
    let flushed = runtime.send(&SendRequest::new("good")).await;

    assert!(!flushed.is_success());
    assert_eq!(flushed.message(), "Batch partially failed: 2 succeeded, 1 failed");
    assert_eq!(flushed.records_processed(), Some(2));
    assert_eq!(flushed.metadata()["error_kind"], json!("partial_batch_failure"));
    assert!(flushed.metadata()["first_error"]
        .as_str()
        .unwrap()
        .contains("HTTP 422"));
    runtime.shutdown().await;
}
