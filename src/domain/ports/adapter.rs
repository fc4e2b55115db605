//! Protocol adapter port.
//!
//! This is the narrow capability interface between the shared runtime and
//! a protocol-specific adapter. The runtime owns the lifecycle state and
//! wraps every call in an error boundary; implementations only supply the
//! protocol work. A hook that returns `Err` or panics is reported as a
//! failed [`OperationResult`] and never reaches the caller.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{
    AdapterDirection, AdapterKind, FetchRequest, OperationResult, Payload, SendRequest,
};

/// Boxed future produced by a single connection check.
pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = AdapterResult<OperationResult>> + Send + 'a>>;

/// One named, independent connection check.
///
/// The future is lazy, so checks only run when the harness awaits them,
/// one after another.
pub struct ConnectionCheck<'a> {
    pub name: String,
    pub check: CheckFuture<'a>,
}

impl<'a> ConnectionCheck<'a> {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Future<Output = AdapterResult<OperationResult>> + Send + 'a,
    {
        Self {
            name: name.into(),
            check: Box::pin(check),
        }
    }
}

impl std::fmt::Debug for ConnectionCheck<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Capability interface implemented by every protocol adapter.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Protocol family of this adapter.
    fn kind(&self) -> AdapterKind;

    /// Data-flow direction of this adapter.
    fn direction(&self) -> AdapterDirection;

    /// Target identifier (URL, directory, queue, ...).
    ///
    /// May contain credentials; the runtime masks it before logging.
    fn target(&self) -> String;

    /// Validate configuration and prepare clients without consuming or producing.
    async fn perform_initialization(&self) -> AdapterResult<OperationResult>;

    /// Begin consuming or producing.
    async fn perform_start(&self) -> AdapterResult<OperationResult>;

    /// Stop consuming or producing; resources may be kept for a restart.
    async fn perform_stop(&self) -> AdapterResult<OperationResult>;

    /// Release every resource held by the adapter.
    async fn perform_shutdown(&self) -> AdapterResult<OperationResult>;

    /// Ordered battery of independent checks making up the connection test.
    ///
    /// The runtime runs them one after another, each in its own error
    /// boundary, and combines the outcomes.
    fn connection_checks(&self) -> Vec<ConnectionCheck<'_>>;

    /// Pull data from the external system (inbound adapters).
    async fn fetch(&self, _request: &FetchRequest) -> AdapterResult<OperationResult> {
        Err(AdapterError::Unsupported(format!(
            "{} {} adapters do not fetch",
            self.kind(),
            self.direction()
        )))
    }

    /// Push one payload to the external system (outbound adapters).
    async fn send(&self, _request: &SendRequest) -> AdapterResult<OperationResult> {
        Err(AdapterError::Unsupported(format!(
            "{} {} adapters do not send",
            self.kind(),
            self.direction()
        )))
    }

    /// Write a drained batch in one downstream operation.
    async fn write_batch(
        &self,
        _items: Vec<Payload>,
        _batch_number: u64,
    ) -> AdapterResult<OperationResult> {
        Err(AdapterError::Unsupported(format!(
            "{} adapters do not support batching",
            self.kind()
        )))
    }

    /// Wake up a blocked protocol call so that polling can stop promptly.
    fn cancel_in_flight(&self) {}
}
