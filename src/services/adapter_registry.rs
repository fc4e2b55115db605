//! Registry of configured adapter runtimes.
//!
//! The [`AdapterRegistry`] owns every runtime built from configuration and
//! drives bulk lifecycle operations over them. Building is non-fatal:
//! adapters that fail to build are reported and skipped, and the registry
//! carries on with whatever was built.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{AdapterConfig, OperationResult};
use crate::services::adapter_factory::AdapterFactory;
use crate::services::adapter_runtime::{AdapterRuntime, AdapterStatus};

/// Result of one bulk operation, per adapter, in execution order.
pub type BulkOutcome = Vec<(String, OperationResult)>;

/// Runtimes keyed by adapter name, in registration order.
#[derive(Default)]
pub struct AdapterRegistry {
    runtimes: Vec<Arc<AdapterRuntime>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}

impl AdapterRegistry {
    /// Build a runtime for every configuration.
    ///
    /// Returns the registry together with the adapters that failed to build.
    pub fn from_configs(configs: &[AdapterConfig]) -> (Self, Vec<(String, AdapterError)>) {
        let mut registry = Self::default();
        let mut failures = Vec::new();

        for config in configs {
            let name = config.name.clone();
            let built = AdapterFactory::build(config.clone())
                .and_then(|runtime| registry.insert(runtime).map(|_| ()));
            if let Err(err) = built {
                warn!(adapter = %name, error = %err, "skipping adapter that failed to build");
                failures.push((name, err));
            }
        }

        info!(count = registry.len(), failed = failures.len(), "adapters registered");
        (registry, failures)
    }

    /// Register a runtime. Names must be unique.
    pub fn insert(&mut self, runtime: AdapterRuntime) -> AdapterResult<Arc<AdapterRuntime>> {
        let name = runtime.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AdapterError::config(format!(
                "Adapter '{name}' is already registered"
            )));
        }

        let runtime = Arc::new(runtime);
        self.index.insert(name, self.runtimes.len());
        self.runtimes.push(Arc::clone(&runtime));
        Ok(runtime)
    }

    /// Look up a runtime by name.
    pub fn get(&self, name: &str) -> Option<Arc<AdapterRuntime>> {
        self.index
            .get(name)
            .map(|&position| Arc::clone(&self.runtimes[position]))
    }

    /// Names of all registered adapters, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.runtimes.iter().map(|runtime| runtime.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    pub async fn initialize_all(&self) -> BulkOutcome {
        let mut outcome = Vec::with_capacity(self.runtimes.len());
        for runtime in &self.runtimes {
            outcome.push((runtime.name().to_string(), runtime.initialize().await));
        }
        outcome
    }

    pub async fn start_all(&self) -> BulkOutcome {
        let mut outcome = Vec::with_capacity(self.runtimes.len());
        for runtime in &self.runtimes {
            outcome.push((runtime.name().to_string(), runtime.start().await));
        }
        outcome
    }

    pub async fn test_all(&self) -> BulkOutcome {
        let mut outcome = Vec::with_capacity(self.runtimes.len());
        for runtime in &self.runtimes {
            outcome.push((runtime.name().to_string(), runtime.test_connection().await));
        }
        outcome
    }

    /// Shut every adapter down, last registered first.
    ///
    /// Never fails; each runtime's shutdown is already infallible.
    pub async fn shutdown_all(&self) -> BulkOutcome {
        let mut outcome = Vec::with_capacity(self.runtimes.len());
        for runtime in self.runtimes.iter().rev() {
            outcome.push((runtime.name().to_string(), runtime.shutdown().await));
        }
        outcome
    }

    pub async fn statuses(&self) -> Vec<AdapterStatus> {
        let mut statuses = Vec::with_capacity(self.runtimes.len());
        for runtime in &self.runtimes {
            statuses.push(runtime.status().await);
        }
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AdapterDirection, AdapterKind, AdapterState};
    use serde_json::json;
    use tempfile::TempDir;

    fn file_config(name: &str, dir: &TempDir, direction: AdapterDirection) -> AdapterConfig {
        AdapterConfig::new(name, AdapterKind::File, direction)
            .with_setting("directory", json!(dir.path().display().to_string()))
    }

    #[test]
    fn test_default_registry_is_empty() {
        let registry = AdapterRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_from_configs_skips_failures() {
        let dir = TempDir::new().unwrap();
        let configs = vec![
            file_config("in", &dir, AdapterDirection::Inbound),
            AdapterConfig::new("mq", AdapterKind::IbmMq, AdapterDirection::Inbound),
            file_config("out", &dir, AdapterDirection::Outbound),
            file_config("in", &dir, AdapterDirection::Outbound),
        ];

        let (registry, failures) = AdapterRegistry::from_configs(&configs);
        assert_eq!(registry.names(), vec!["in", "out"]);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, "mq");
        assert!(failures[1].1.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_bulk_lifecycle() {
        let dir = TempDir::new().unwrap();
        let configs = vec![
            file_config("in", &dir, AdapterDirection::Inbound),
            file_config("out", &dir, AdapterDirection::Outbound),
        ];
        let (registry, _) = AdapterRegistry::from_configs(&configs);

        assert!(registry.initialize_all().await.iter().all(|(_, r)| r.is_success()));
        assert!(registry.start_all().await.iter().all(|(_, r)| r.is_success()));

        let tests = registry.test_all().await;
        assert!(tests.iter().all(|(_, r)| r.is_success()));

        let shutdown = registry.shutdown_all().await;
        let order: Vec<&str> = shutdown.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(order, vec!["out", "in"]);
        assert!(registry
            .statuses()
            .await
            .iter()
            .all(|status| status.state == AdapterState::ShutDown));
    }
}
