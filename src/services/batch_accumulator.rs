//! Size- and time-triggered batching for outbound adapters.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::domain::errors::AdapterResult;
use crate::domain::models::{BatchPolicy, BatchStrategy, OperationResult, Payload};
use crate::services::hook_boundary::failure_result;

/// Downstream bulk write performed when a batch is flushed.
#[async_trait]
pub trait BatchWriter: Send + Sync {
    /// Write every item in one operation. `batch_number` starts at 1.
    async fn write_batch(&self, items: Vec<Payload>, batch_number: u64)
        -> AdapterResult<OperationResult>;
}

/// Pending payloads plus flush bookkeeping.
#[derive(Debug)]
pub struct BatchBuffer {
    items: Vec<Payload>,
    last_flush: Instant,
    batch_counter: u64,
}

impl BatchBuffer {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            last_flush: Instant::now(),
            batch_counter: 0,
        }
    }
}

/// Buffers payloads and flushes them through a [`BatchWriter`].
///
/// `add` and `flush` share one lock, so a flush is atomic with respect to
/// concurrent adds and flushes run one at a time.
pub struct BatchAccumulator {
    name: String,
    policy: BatchPolicy,
    buffer: Mutex<BatchBuffer>,
    writer: Arc<dyn BatchWriter>,
}

impl std::fmt::Debug for BatchAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchAccumulator")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl BatchAccumulator {
    pub fn new(name: impl Into<String>, policy: BatchPolicy, writer: Arc<dyn BatchWriter>) -> Self {
        Self {
            name: name.into(),
            policy,
            buffer: Mutex::new(BatchBuffer::new()),
            writer,
        }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Append a payload and flush if the strategy says so.
    ///
    /// Without a flush the result is `"Added to batch (n/limit items)"`;
    /// with one it is the bulk-write result.
    pub async fn add(&self, payload: Payload) -> OperationResult {
        let mut buffer = self.buffer.lock().await;
        buffer.items.push(payload);

        if self.should_flush(&buffer) {
            return self.flush_locked(&mut buffer).await;
        }

        let pending = buffer.items.len();
        let limit = self
            .policy
            .size
            .map_or_else(|| "unbounded".to_string(), |size| size.to_string());
        debug!(adapter = %self.name, pending, "payload added to batch");
        OperationResult::success(format!("Added to batch ({pending}/{limit} items)"))
            .with_metadata("pending", json!(pending))
    }

    /// Flush whatever is pending.
    pub async fn flush(&self) -> OperationResult {
        let mut buffer = self.buffer.lock().await;
        self.flush_locked(&mut buffer).await
    }

    /// Restart the time trigger from now.
    ///
    /// Called when the owning adapter starts running, so idle time before
    /// a start or restart never counts toward the batch timeout.
    pub async fn reset_timer(&self) {
        self.buffer.lock().await.last_flush = Instant::now();
    }

    pub async fn pending_len(&self) -> usize {
        self.buffer.lock().await.items.len()
    }

    /// Number of batches handed to the writer so far.
    pub async fn batch_count(&self) -> u64 {
        self.buffer.lock().await.batch_counter
    }

    fn should_flush(&self, buffer: &BatchBuffer) -> bool {
        let size_reached = self
            .policy
            .size
            .is_some_and(|size| buffer.items.len() >= size);
        let time_reached = buffer.last_flush.elapsed() >= self.policy.timeout;

        match self.policy.strategy {
            BatchStrategy::SizeBased => size_reached,
            BatchStrategy::TimeBased => time_reached,
            BatchStrategy::Mixed => size_reached || time_reached,
        }
    }

    async fn flush_locked(&self, buffer: &mut BatchBuffer) -> OperationResult {
        if buffer.items.is_empty() {
            return OperationResult::success("No items in batch to flush");
        }

        let items = std::mem::take(&mut buffer.items);
        buffer.last_flush = Instant::now();
        buffer.batch_counter += 1;
        let batch_number = buffer.batch_counter;
        let count = items.len();

        info!(adapter = %self.name, batch_number, items = count, "flushing batch");

        let result = match self.writer.write_batch(items, batch_number).await {
            Ok(result) => result,
            Err(err) => failure_result(&err),
        };

        if result.is_success() {
            info!(adapter = %self.name, batch_number, items = count, "batch flushed");
        } else {
            error!(
                adapter = %self.name,
                batch_number,
                items = count,
                reason = %result.message(),
                "batch write failed, items dropped"
            );
        }

        let result = result
            .with_metadata("batch_number", json!(batch_number))
            .with_metadata("batch_items", json!(count));
        if result.is_success() && result.records_processed().is_none() {
            result.with_records_processed(count as u64)
        } else {
            result
        }
    }
}
