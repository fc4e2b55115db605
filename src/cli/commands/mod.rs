//! CLI command implementations.

pub mod poll;
pub mod send;
pub mod test;
pub mod validate;

use anyhow::{anyhow, bail, Context, Result};

use crate::domain::models::RuntimeConfig;
use crate::services::{AdapterFactory, AdapterRuntime};

/// Build the runtime for one configured adapter.
pub(crate) fn build_runtime(config: &RuntimeConfig, name: &str) -> Result<AdapterRuntime> {
    let adapter = config
        .adapter(name)
        .ok_or_else(|| anyhow!("No adapter named '{name}' in configuration"))?;
    AdapterFactory::build(adapter.clone())
        .with_context(|| format!("Failed to build adapter '{name}'"))
}

/// Initialize and start a runtime, shutting it down again on failure.
pub(crate) async fn bring_up(runtime: &AdapterRuntime) -> Result<()> {
    let initialized = runtime.initialize().await;
    if !initialized.is_success() {
        runtime.shutdown().await;
        bail!("Failed to initialize '{}': {}", runtime.name(), initialized.message());
    }

    let started = runtime.start().await;
    if !started.is_success() {
        runtime.shutdown().await;
        bail!("Failed to start '{}': {}", runtime.name(), started.message());
    }
    Ok(())
}
