//! Lifecycle runtime shared by every protocol adapter.
//!
//! [`AdapterRuntime`] owns the state machine, the polling scheduler and the
//! optional batch accumulator of one adapter instance, and calls into the
//! adapter only through [`ProtocolAdapter`] hooks wrapped in the hook
//! boundary. Every public operation returns an [`OperationResult`]; an
//! illegal call for the current state is reported as a failure, never as a
//! panic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn, Instrument, Span};
use uuid::Uuid;

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{
    AdapterConfig, AdapterDirection, AdapterKind, AdapterState, FetchRequest, OperationResult,
    Payload, SendRequest,
};
use crate::domain::ports::ProtocolAdapter;
use crate::infrastructure::logging::scrubber;
use crate::services::batch_accumulator::{BatchAccumulator, BatchWriter};
use crate::services::connection_test::run_connection_checks;
use crate::services::hook_boundary::{failure_result, guarded, into_result};
use crate::services::polling_scheduler::{DataCallback, PollJob, PollingScheduler};
use crate::services::state_machine::StateMachine;

use AdapterState::{
    Failed, Initialized, Initializing, Running, ShutDown, ShuttingDown, Starting, Stopped,
    Stopping, Uninitialized,
};

const NON_TERMINAL: [AdapterState; 9] = [
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Failed,
];

/// Point-in-time view of a runtime, for operators.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterStatus {
    pub id: Uuid,
    pub name: String,
    pub kind: AdapterKind,
    pub direction: AdapterDirection,
    pub state: AdapterState,
    pub target: String,
    pub polling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_batch: Option<usize>,
}

/// Routes flushed batches to the adapter's `write_batch` hook.
struct HookBatchWriter {
    adapter: Arc<dyn ProtocolAdapter>,
    limit: Duration,
    span: Span,
}

#[async_trait]
impl BatchWriter for HookBatchWriter {
    async fn write_batch(
        &self,
        items: Vec<Payload>,
        batch_number: u64,
    ) -> AdapterResult<OperationResult> {
        guarded(
            "write_batch",
            Some(self.limit),
            self.adapter.write_batch(items, batch_number),
        )
        .instrument(self.span.clone())
        .await
    }
}

/// One adapter instance under lifecycle control.
pub struct AdapterRuntime {
    id: Uuid,
    config: AdapterConfig,
    adapter: Arc<dyn ProtocolAdapter>,
    state: StateMachine,
    poller: PollingScheduler,
    batch: Option<BatchAccumulator>,
    span: Span,
}

impl std::fmt::Debug for AdapterRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRuntime")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("state", &self.state.current())
            .finish_non_exhaustive()
    }
}

impl AdapterRuntime {
    /// Wrap `adapter` using `config`, which is validated first.
    pub fn new(config: AdapterConfig, adapter: Arc<dyn ProtocolAdapter>) -> AdapterResult<Self> {
        let config = config.validated()?;
        let id = Uuid::new_v4();
        let span = tracing::info_span!(
            "adapter",
            adapter = %config.name,
            protocol = %config.kind,
            direction = %config.direction,
            target = %scrubber().mask_url(&adapter.target()),
            instance = %id,
        );

        let batch = (config.batch.enabled && !config.direction.is_inbound()).then(|| {
            let writer = HookBatchWriter {
                adapter: Arc::clone(&adapter),
                limit: config.timeouts.operation(),
                span: span.clone(),
            };
            BatchAccumulator::new(config.name.clone(), config.batch.policy(), Arc::new(writer))
        });

        Ok(Self {
            id,
            poller: PollingScheduler::new(config.name.clone()),
            config,
            adapter,
            state: StateMachine::new(),
            batch,
            span,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn state(&self) -> AdapterState {
        self.state.current()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    /// Payloads waiting in the batch buffer; zero when batching is off.
    pub async fn pending_batch_len(&self) -> usize {
        match &self.batch {
            Some(batch) => batch.pending_len().await,
            None => 0,
        }
    }

    pub async fn status(&self) -> AdapterStatus {
        let pending_batch = match &self.batch {
            Some(batch) => Some(batch.pending_len().await),
            None => None,
        };
        AdapterStatus {
            id: self.id,
            name: self.config.name.clone(),
            kind: self.config.kind,
            direction: self.config.direction,
            state: self.state.current(),
            target: scrubber().mask_url(&self.adapter.target()),
            polling: self.poller.is_polling(),
            pending_batch,
        }
    }

    /// Validate configuration and prepare clients.
    ///
    /// Legal from `UNINITIALIZED` or `FAILED`.
    pub async fn initialize(&self) -> OperationResult {
        const OP: &str = "initialize";
        if let Err(err) = self.state.begin(OP, &[Uninitialized, Failed], Initializing) {
            return self.rejected(&err);
        }

        let result = self.call(OP, self.adapter.perform_initialization()).await;
        self.settle(OP, &result, Initialized);
        result
    }

    /// Begin consuming or producing.
    ///
    /// Legal from `INITIALIZED` or `STOPPED`. The batch time trigger
    /// restarts here. Inbound adapters with `polling.auto_start` start
    /// polling once running.
    pub async fn start(&self) -> OperationResult {
        const OP: &str = "start";
        if let Err(err) = self.state.begin(OP, &[Initialized, Stopped], Starting) {
            return self.rejected(&err);
        }

        let result = self.call(OP, self.adapter.perform_start()).await;
        if result.is_success() {
            if let Some(batch) = &self.batch {
                batch.reset_timer().await;
            }
        }
        self.settle(OP, &result, Running);

        if result.is_success() && self.config.direction.is_inbound() && self.config.polling.auto_start
        {
            let polling = self.start_configured_polling();
            return result.with_metadata("polling", json!(polling.is_success()));
        }
        result
    }

    /// Stop polling, flush the pending batch, then stop the adapter.
    ///
    /// Legal from `RUNNING`.
    pub async fn stop(&self) -> OperationResult {
        const OP: &str = "stop";
        if let Err(err) = self.state.begin(OP, &[Running], Stopping) {
            return self.rejected(&err);
        }

        self.halt_polling().await;
        let flushed = self.flush_pending(OP).await;

        let result = self.call(OP, self.adapter.perform_stop()).await;
        self.settle(OP, &result, Stopped);

        match flushed {
            Some(flush) => result.with_metadata("batch_flush", json!(flush.message())),
            None => result,
        }
    }

    /// Release every resource. Idempotent and always succeeds.
    ///
    /// Flush and cleanup errors are logged, never reported as the outcome.
    pub async fn shutdown(&self) -> OperationResult {
        const OP: &str = "shutdown";
        if let Err(err) = self.state.begin(OP, &NON_TERMINAL, ShuttingDown) {
            if matches!(err, AdapterError::IllegalState { state: ShutDown, .. }) {
                return OperationResult::success("Adapter already shut down");
            }
            return self.rejected(&err);
        }

        self.halt_polling().await;
        let flushed = self.flush_pending(OP).await;

        let cleanup = self.call(OP, self.adapter.perform_shutdown()).await;
        if !cleanup.is_success() {
            let err = AdapterError::ResourceCleanup(cleanup.message().to_string());
            warn!(parent: &self.span, error = %err, "cleanup failed during shutdown");
        }

        self.state.settle(ShutDown);
        info!(parent: &self.span, "adapter shut down");

        let mut result = OperationResult::success("Adapter shut down");
        if let Some(flush) = flushed {
            result = result.with_metadata("batch_flush", json!(flush.message()));
        }
        if !cleanup.is_success() {
            result = result.with_metadata("cleanup_error", json!(cleanup.message()));
        }
        result
    }

    /// Run the adapter's connection checks without changing state.
    ///
    /// Legal in `INITIALIZED` or `RUNNING`.
    pub async fn test_connection(&self) -> OperationResult {
        const OP: &str = "test connection";
        if let Err(err) = self.state.require(OP, &[Initialized, Running]) {
            return self.rejected(&err);
        }

        let checks = self.adapter.connection_checks();
        let result = self
            .call(OP, async { Ok(run_connection_checks(checks).await) })
            .await;
        if result.is_success() {
            info!(parent: &self.span, "connection test passed");
        } else {
            warn!(parent: &self.span, reason = %result.message(), "connection test failed");
        }
        result
    }

    /// Pull data once. Legal only while `RUNNING`.
    pub async fn fetch(&self, request: &FetchRequest) -> OperationResult {
        const OP: &str = "fetch";
        if let Err(err) = self.state.require(OP, &[Running]) {
            return self.rejected(&err);
        }
        self.call(OP, self.adapter.fetch(request)).await
    }

    /// Push one payload. Legal only while `RUNNING`.
    ///
    /// With batching enabled the payload goes to the accumulator and the
    /// request headers are not used.
    pub async fn send(&self, request: &SendRequest) -> OperationResult {
        const OP: &str = "send";
        if let Err(err) = self.state.require(OP, &[Running]) {
            return self.rejected(&err);
        }

        match &self.batch {
            Some(batch) => batch.add(request.payload.clone()).instrument(self.span.clone()).await,
            None => self.call(OP, self.adapter.send(request)).await,
        }
    }

    /// Flush the pending batch now.
    pub async fn flush(&self) -> OperationResult {
        match &self.batch {
            Some(batch) => batch.flush().instrument(self.span.clone()).await,
            None => OperationResult::success("Batching is not enabled"),
        }
    }

    /// Register the callback that receives polling results.
    pub fn register_data_callback<F>(&self, callback: F)
    where
        F: Fn(Option<Value>, OperationResult) + Send + Sync + 'static,
    {
        let callback: DataCallback = Arc::new(callback);
        self.poller.register_data_callback(callback);
    }

    /// Start polling with the configured interval.
    pub fn start_configured_polling(&self) -> OperationResult {
        self.start_polling(self.config.polling.interval())
    }

    /// Start polling `fetch` every `interval`. Legal only while `RUNNING`.
    pub fn start_polling(&self, interval: Duration) -> OperationResult {
        const OP: &str = "start polling";
        if let Err(err) = self.state.require(OP, &[Running]) {
            return self.rejected(&err);
        }
        if !self.config.direction.is_inbound() {
            return self.rejected(&AdapterError::Unsupported(format!(
                "{} is an outbound adapter and cannot poll",
                self.config.name
            )));
        }
        if interval.is_zero() {
            return self.rejected(&AdapterError::config("polling interval must be greater than zero"));
        }

        let _entered = self.span.enter();
        if self.poller.start_polling(interval, self.poll_job()) {
            OperationResult::success(format!("Polling started every {} ms", interval.as_millis()))
        } else {
            OperationResult::success("Polling already active")
        }
    }

    /// Stop polling and wait for an in-flight cycle, bounded by the grace period.
    pub async fn stop_polling(&self) -> OperationResult {
        if self.halt_polling().await {
            OperationResult::success("Polling stopped")
        } else {
            OperationResult::success("Polling was not active")
        }
    }

    async fn halt_polling(&self) -> bool {
        if self.poller.is_polling() {
            self.adapter.cancel_in_flight();
        }
        self.poller
            .stop_polling(self.config.timeouts.shutdown_grace())
            .instrument(self.span.clone())
            .await
    }

    async fn flush_pending(&self, operation: &str) -> Option<OperationResult> {
        let batch = self.batch.as_ref()?;
        if batch.pending_len().await == 0 {
            return None;
        }

        let result = batch.flush().instrument(self.span.clone()).await;
        if !result.is_success() {
            error!(
                parent: &self.span,
                operation,
                reason = %result.message(),
                "flushing pending batch failed"
            );
        }
        Some(result)
    }

    fn poll_job(&self) -> PollJob {
        let adapter = Arc::clone(&self.adapter);
        let request = Arc::new(FetchRequest::new(self.config.polling.params.clone()));
        let limit = self.config.timeouts.operation();
        let span = self.span.clone();

        Arc::new(move || {
            let adapter = Arc::clone(&adapter);
            let request = Arc::clone(&request);
            async move { into_result(guarded("fetch", Some(limit), adapter.fetch(&request)).await) }
                .instrument(span.clone())
                .boxed()
        })
    }

    async fn call<F>(&self, operation: &str, hook: F) -> OperationResult
    where
        F: Future<Output = AdapterResult<OperationResult>>,
    {
        let outcome = guarded(operation, Some(self.config.timeouts.operation()), hook)
            .instrument(self.span.clone())
            .await;
        if let Err(err) = &outcome {
            error!(
                parent: &self.span,
                operation,
                kind = err.kind(),
                error = %scrubber().scrub_message(&err.to_string()),
                "adapter hook failed"
            );
        }
        into_result(outcome)
    }

    fn settle(&self, operation: &str, result: &OperationResult, success_state: AdapterState) {
        if result.is_success() {
            self.state.settle(success_state);
            info!(parent: &self.span, operation, state = %success_state, "lifecycle transition");
        } else {
            self.state.settle(Failed);
            error!(
                parent: &self.span,
                operation,
                reason = %result.message(),
                "lifecycle operation failed"
            );
        }
    }

    fn rejected(&self, err: &AdapterError) -> OperationResult {
        warn!(parent: &self.span, error = %err, "rejected call");
        failure_result(err)
    }
}
