//! Domain errors for the Switchyard adapter runtime.

use thiserror::Error;

use crate::domain::models::adapter_state::AdapterState;

/// Errors raised by protocol adapters and the runtime around them.
///
/// Hooks return these instead of panicking; the lifecycle boundary turns
/// every variant into a failed [`OperationResult`](crate::domain::models::OperationResult).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connectivity error: {0}")]
    TransientConnectivity(String),

    #[error("Batch partially failed: {succeeded} succeeded, {failed} failed")]
    PartialBatchFailure { succeeded: usize, failed: usize },

    #[error("Batch failed: all {failed} items failed")]
    BatchFailure { failed: usize },

    #[error("Cleanup error: {0}")]
    ResourceCleanup(String),

    #[error("Cannot {operation} while adapter is {state}")]
    IllegalState {
        operation: String,
        state: AdapterState,
    },

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{operation} panicked: {message}")]
    HookPanicked { operation: String, message: String },
}

pub type AdapterResult<T> = Result<T, AdapterError>;

impl AdapterError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for a transient connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::TransientConnectivity(message.into())
    }

    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::TransientConnectivity(_) => "transient_connectivity",
            Self::PartialBatchFailure { .. } => "partial_batch_failure",
            Self::BatchFailure { .. } => "batch_failure",
            Self::ResourceCleanup(_) => "resource_cleanup",
            Self::IllegalState { .. } => "illegal_state",
            Self::Unsupported(_) => "unsupported",
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
            Self::Http(_) => "http",
            Self::Serialization(_) => "serialization",
            Self::HookPanicked { .. } => "hook_panicked",
        }
    }

    /// Whether an external orchestrator may reasonably retry the operation.
    ///
    /// The runtime itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransientConnectivity(_) | Self::Timeout(_) | Self::Io(_) | Self::Http(_)
        )
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        // The URL may carry credentials, so it never reaches the message.
        let err = err.without_url();
        if err.is_timeout() {
            Self::TransientConnectivity(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::TransientConnectivity(format!("connection failed: {err}"))
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
