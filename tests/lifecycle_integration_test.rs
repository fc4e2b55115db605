//! Lifecycle integration tests
//!
//! Drives runtimes through the state machine with a scripted adapter and
//! with the built-in file adapter.

mod common;

use std::sync::atomic::Ordering;

use serde_json::json;
use switchyard::domain::models::{AdapterDirection, AdapterKind, AdapterState, SendRequest};
use switchyard::{AdapterConfig, AdapterFactory};

use common::{outbound_config, runtime_for, ScriptedAdapter};

#[tokio::test]
async fn test_initialize_failure_moves_to_failed_and_blocks_start() {
    common::setup_test_logging();
    let adapter = ScriptedAdapter::outbound();
    adapter.fail_initialization.store(true, Ordering::SeqCst);
    let runtime = runtime_for(outbound_config("orders"), &adapter);

    let result = runtime.initialize().await;
    assert!(!result.is_success());
    assert!(result.message().contains("required"));
    assert_eq!(result.metadata()["error_kind"], json!("configuration"));
    assert_eq!(runtime.state(), AdapterState::Failed);

    let start = runtime.start().await;
    assert!(!start.is_success());
    assert_eq!(start.message(), "Cannot start while adapter is FAILED");
    assert_eq!(runtime.state(), AdapterState::Failed);
}

#[tokio::test]
async fn test_failed_adapter_can_be_reinitialized() {
    let adapter = ScriptedAdapter::outbound();
    adapter.fail_initialization.store(true, Ordering::SeqCst);
    let runtime = runtime_for(outbound_config("orders"), &adapter);

    runtime.initialize().await;
    assert_eq!(runtime.state(), AdapterState::Failed);

    adapter.fail_initialization.store(false, Ordering::SeqCst);
    assert!(runtime.initialize().await.is_success());
    assert!(runtime.start().await.is_success());
    assert_eq!(runtime.state(), AdapterState::Running);
}

#[tokio::test]
async fn test_illegal_calls_report_failures_without_state_change() {
    let adapter = ScriptedAdapter::outbound();
    let runtime = runtime_for(outbound_config("orders"), &adapter);

    for result in [
        runtime.start().await,
        runtime.stop().await,
        runtime.test_connection().await,
        runtime.send(&SendRequest::new("early")).await,
    ] {
        assert!(!result.is_success());
        assert!(result.message().ends_with("while adapter is UNINITIALIZED"));
        assert_eq!(result.metadata()["error_kind"], json!("illegal_state"));
    }
    assert_eq!(runtime.state(), AdapterState::Uninitialized);
    assert!(adapter.sends.lock().unwrap().is_empty());

    runtime.initialize().await;
    let again = runtime.initialize().await;
    assert_eq!(again.message(), "Cannot initialize while adapter is INITIALIZED");
}

#[tokio::test]
async fn test_panicking_hook_is_contained() {
    let adapter = ScriptedAdapter::outbound();
    adapter.panic_on_send.store(true, Ordering::SeqCst);
    let runtime = runtime_for(outbound_config("orders"), &adapter);
    runtime.initialize().await;
    runtime.start().await;

    let result = runtime.send(&SendRequest::new("boom")).await;
    assert!(!result.is_success());
    assert!(result.message().contains("driver crashed"));
    assert_eq!(result.metadata()["error_kind"], json!("hook_panicked"));
    assert_eq!(runtime.state(), AdapterState::Running);
}

#[tokio::test]
async fn test_connection_test_combines_checks() {
    let adapter = ScriptedAdapter::outbound();
    let runtime = runtime_for(outbound_config("orders"), &adapter);
    runtime.initialize().await;

    let result = runtime.test_connection().await;
    assert!(result.is_success());
    assert_eq!(result.message(), "All 2 checks passed");
    assert_eq!(result.metadata()["checks_total"], json!(2));
    assert_eq!(runtime.state(), AdapterState::Initialized);
}

#[tokio::test]
async fn test_shutdown_from_every_state_ends_shut_down() {
    let adapter = ScriptedAdapter::outbound();
    let untouched = runtime_for(outbound_config("a"), &adapter);
    assert!(untouched.shutdown().await.is_success());
    assert_eq!(untouched.state(), AdapterState::ShutDown);

    let running = runtime_for(outbound_config("b"), &adapter);
    running.initialize().await;
    running.start().await;
    assert!(running.shutdown().await.is_success());
    assert_eq!(running.state(), AdapterState::ShutDown);

    let after = running.initialize().await;
    assert!(!after.is_success());
    assert_eq!(after.message(), "Cannot initialize while adapter is SHUT_DOWN");
    assert_eq!(adapter.shutdowns.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_file_adapter_without_directory_fails_initialization() {
    let config = AdapterConfig::new("drop", AdapterKind::File, AdapterDirection::Inbound);
    let runtime = AdapterFactory::build(config).unwrap();

    let result = runtime.initialize().await;
    assert!(!result.is_success());
    assert!(result.message().contains("Source directory is required"));
    assert_eq!(runtime.state(), AdapterState::Failed);
    assert!(!runtime.start().await.is_success());
}

#[tokio::test]
async fn test_status_reports_masked_target() {
    let adapter = ScriptedAdapter::outbound();
    let runtime = runtime_for(outbound_config("orders"), &adapter);
    runtime.initialize().await;

    let status = runtime.status().await;
    assert_eq!(status.state, AdapterState::Initialized);
    assert!(!status.target.contains("hunter2"));
    assert!(!status.polling);
}
