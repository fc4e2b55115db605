//! Domain models for the adapter runtime.

pub mod adapter;
pub mod adapter_config;
pub mod adapter_state;
pub mod config;
pub mod operation_result;
pub mod request;

pub use adapter::{AdapterDirection, AdapterKind};
pub use adapter_config::{
    AdapterConfig, BatchPolicy, BatchSettings, BatchStrategy, PollingSettings, TimeoutSettings,
    DEFAULT_BATCH_TIMEOUT_MS,
};
pub use adapter_state::AdapterState;
pub use config::{LogFormat, LoggingConfig, RotationPolicy, RuntimeConfig};
pub use operation_result::OperationResult;
pub use request::{FetchRequest, Payload, SendRequest};
