//! Switchyard - protocol adapter runtime
//!
//! Switchyard gives every protocol adapter the same lifecycle, polling and
//! batching behaviour. Protocol code implements a handful of hooks on
//! [`ProtocolAdapter`]; the runtime enforces legal state transitions, turns
//! hook errors into [`OperationResult`] failures, polls inbound adapters on a
//! fixed delay and accumulates outbound sends into batches.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, error taxonomy and the adapter port
//! - **Service Layer** (`services`): lifecycle runtime, polling, batching, registry
//! - **Adapters** (`adapters`): built-in file and REST adapters
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use switchyard::{AdapterFactory, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let runtime = AdapterFactory::build(config.adapters[0].clone())?;
//!     runtime.initialize().await;
//!     runtime.start().await;
//!     runtime.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{AdapterError, AdapterResult};
pub use domain::models::{
    AdapterConfig, AdapterDirection, AdapterKind, AdapterState, BatchSettings, BatchStrategy,
    FetchRequest, LoggingConfig, OperationResult, Payload, PollingSettings, RuntimeConfig,
    SendRequest, TimeoutSettings,
};
pub use domain::ports::{ConnectionCheck, ProtocolAdapter};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::LoggerImpl;
pub use services::{
    AdapterFactory, AdapterRegistry, AdapterRuntime, AdapterStatus, BatchAccumulator, BatchWriter,
    PollingScheduler,
};
