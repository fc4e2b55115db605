//! Builds adapter runtimes from configuration.

use std::sync::Arc;

use crate::adapters::{FileInboundAdapter, FileOutboundAdapter, RestOutboundAdapter};
use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{AdapterConfig, AdapterDirection, AdapterKind};
use crate::domain::ports::ProtocolAdapter;
use crate::services::adapter_runtime::AdapterRuntime;

/// Creates built-in adapters and wraps them in an [`AdapterRuntime`].
pub struct AdapterFactory;

impl AdapterFactory {
    /// Validate `config` and build a runtime around the matching adapter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid configuration, for batching
    /// on a protocol that cannot batch, and for protocols without a
    /// built-in implementation.
    pub fn build(config: AdapterConfig) -> AdapterResult<AdapterRuntime> {
        let config = config.validated()?;
        if config.batch.enabled && !config.kind.supports_batching() {
            return Err(AdapterError::config(format!(
                "{} adapters do not support batching",
                config.kind
            )));
        }

        let adapter = Self::create_adapter(&config)?;
        AdapterRuntime::new(config, adapter)
    }

    /// Instantiate the built-in adapter for a protocol and direction.
    pub fn create_adapter(config: &AdapterConfig) -> AdapterResult<Arc<dyn ProtocolAdapter>> {
        use AdapterDirection::{Inbound, Outbound};
        use AdapterKind::{File, Http, Rest};

        match (config.kind, config.direction) {
            (File, Inbound) => Ok(Arc::new(FileInboundAdapter::new(config.clone()))),
            (File, Outbound) => Ok(Arc::new(FileOutboundAdapter::new(config.clone()))),
            (Rest | Http, Outbound) => Ok(Arc::new(RestOutboundAdapter::new(config.clone()))),
            (kind, direction) => Err(AdapterError::config(format!(
                "No built-in {direction} adapter for protocol '{kind}'"
            ))),
        }
    }

    /// Whether a built-in adapter exists for the combination.
    pub fn supports(kind: AdapterKind, direction: AdapterDirection) -> bool {
        matches!(
            (kind, direction),
            (AdapterKind::File, _)
                | (AdapterKind::Rest | AdapterKind::Http, AdapterDirection::Outbound)
        )
    }
}
