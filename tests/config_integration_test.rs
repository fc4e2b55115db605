//! Configuration loading integration tests
//!
//! Environment-dependent tests run under `temp_env` so variables never
//! leak between tests.

use std::io::Write;

use switchyard::domain::models::{AdapterKind, BatchStrategy, LogFormat};
use switchyard::{AdapterRegistry, ConfigLoader};

const CONFIG: &str = r#"
logging:
  level: debug
  format: pretty
adapters:
  - name: drop-zone
    kind: file
    direction: inbound
    settings:
      directory: /var/spool/in
      pattern: "*.csv"
    polling:
      interval_ms: 5000
      auto_start: true
  - name: ledger
    kind: rest
    direction: outbound
    settings:
      url: https://ledger.example.com/entries
    batch:
      enabled: true
      strategy: mixed
      size: 50
      timeout_ms: 2000
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_loads_adapters_from_yaml() {
    let file = write_config(CONFIG);
    let config = temp_env::with_var_unset("SWITCHYARD_LOGGING__LEVEL", || {
        ConfigLoader::load_from_file(file.path()).unwrap()
    });

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.adapters.len(), 2);

    let inbound = config.adapter("drop-zone").unwrap();
    assert_eq!(inbound.kind, AdapterKind::File);
    assert_eq!(inbound.polling.interval_ms, 5000);
    assert!(inbound.polling.auto_start);
    assert_eq!(inbound.setting_str("pattern"), Some("*.csv"));

    let outbound = config.adapter("ledger").unwrap();
    assert_eq!(outbound.batch.strategy, BatchStrategy::Mixed);
    assert_eq!(outbound.batch.size, Some(50));
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config(CONFIG);
    let config = temp_env::with_var("SWITCHYARD_LOGGING__LEVEL", Some("warn"), || {
        ConfigLoader::load_from_file(file.path()).unwrap()
    });
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_invalid_adapter_is_rejected_with_its_name() {
    let file = write_config(
        r#"
adapters:
  - name: feed
    kind: file
    direction: inbound
    polling:
      interval_ms: 0
"#,
    );
    let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("feed"), "{message}");
    assert!(message.contains("interval_ms"), "{message}");
}

#[test]
fn test_registry_builds_from_loaded_config() {
    let file = write_config(CONFIG);
    let config = ConfigLoader::load_from_file(file.path()).unwrap();

    let (registry, failures) = AdapterRegistry::from_configs(&config.adapters);
    assert!(failures.is_empty());
    assert_eq!(registry.names(), vec!["drop-zone", "ledger"]);
}

#[test]
fn test_missing_file_is_an_error() {
    let err = ConfigLoader::load_from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Configuration file not found"));
}
