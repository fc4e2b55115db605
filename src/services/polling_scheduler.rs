//! Fixed-delay background polling for inbound adapters.
//!
//! One worker task per scheduler. A cycle runs the poll job, delivers the
//! outcome to the registered callback, then sleeps for the interval; cycles
//! never overlap. Stopping flips the polling flag, signals the worker
//! (cancelling a fetch that is still in flight), waits up to a grace period
//! and aborts the task if it has not exited by then.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::domain::models::OperationResult;
use crate::services::hook_boundary::panic_message;

/// Default time `stop_polling` waits for an in-flight cycle.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Receives `(data, result)` for every delivered poll cycle.
///
/// `data` is `None` when the cycle failed.
pub type DataCallback = Arc<dyn Fn(Option<Value>, OperationResult) + Send + Sync>;

/// Produces the future for one poll cycle.
pub type PollJob = Arc<dyn Fn() -> BoxFuture<'static, OperationResult> + Send + Sync>;

struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Cancellable, non-overlapping polling loop.
pub struct PollingScheduler {
    name: String,
    polling: Arc<AtomicBool>,
    callback: Arc<RwLock<Option<DataCallback>>>,
    // Held while a callback runs; stop_polling acquires it as a barrier.
    delivery: Arc<tokio::sync::Mutex<()>>,
    worker: Mutex<Option<Worker>>,
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("name", &self.name)
            .field("polling", &self.is_polling())
            .finish_non_exhaustive()
    }
}

impl PollingScheduler {
    /// Create an idle scheduler for the named adapter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polling: Arc::new(AtomicBool::new(false)),
            callback: Arc::new(RwLock::new(None)),
            delivery: Arc::new(tokio::sync::Mutex::new(())),
            worker: Mutex::new(None),
        }
    }

    /// Register the callback that receives poll results, replacing any previous one.
    pub fn register_data_callback(&self, callback: DataCallback) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    pub fn is_polling(&self) -> bool {
        self.polling.load(Ordering::Acquire)
    }

    /// Spawn the polling worker.
    ///
    /// Returns `false` without side effects when polling is already active.
    /// The first cycle runs immediately.
    pub fn start_polling(&self, interval: Duration, job: PollJob) -> bool {
        if self
            .polling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(adapter = %self.name, "polling already active, ignoring start request");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let poll_loop = PollLoop {
            name: self.name.clone(),
            interval,
            job,
            polling: Arc::clone(&self.polling),
            callback: Arc::clone(&self.callback),
            delivery: Arc::clone(&self.delivery),
        };
        let handle = tokio::spawn(poll_loop.run(stop_rx));

        let previous = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Worker { stop_tx, handle });
        if let Some(stale) = previous {
            stale.handle.abort();
        }

        info!(adapter = %self.name, interval = ?interval, "polling started");
        true
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Idempotent. Returns within `grace`. Once this returns, no new callback
    /// invocation starts until polling is restarted. Returns whether a worker
    /// was running.
    pub async fn stop_polling(&self, grace: Duration) -> bool {
        self.polling.store(false, Ordering::Release);

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(Worker { stop_tx, mut handle }) = worker else {
            return false;
        };

        // The receiver is gone if the worker already exited.
        let _ = stop_tx.send(true);
        let deadline = tokio::time::Instant::now() + grace;

        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(())) => debug!(adapter = %self.name, "polling worker exited"),
            Ok(Err(err)) => error!(adapter = %self.name, error = %err, "polling worker terminated abnormally"),
            Err(_) => {
                warn!(
                    adapter = %self.name,
                    grace = ?grace,
                    "polling worker did not exit within grace period, aborting"
                );
                handle.abort();
            }
        }

        // Wait out a delivery that was already past the flag check. A
        // callback still running at the deadline is left to finish on its
        // own; the cleared flag keeps any further delivery from starting.
        if tokio::time::timeout_at(deadline, self.delivery.lock())
            .await
            .is_err()
        {
            warn!(
                adapter = %self.name,
                grace = ?grace,
                "data callback still running after grace period, not waiting for it"
            );
        }

        info!(adapter = %self.name, "polling stopped");
        true
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.handle.abort();
        }
    }
}

struct PollLoop {
    name: String,
    interval: Duration,
    job: PollJob,
    polling: Arc<AtomicBool>,
    callback: Arc<RwLock<Option<DataCallback>>>,
    delivery: Arc<tokio::sync::Mutex<()>>,
}

impl PollLoop {
    async fn run(self, mut stop_rx: watch::Receiver<bool>) {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            trace!(adapter = %self.name, cycle, "poll cycle starting");

            let result = tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                result = (self.job)() => result,
            };
            self.deliver(cycle, result).await;

            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                () = tokio::time::sleep(self.interval) => {}
            }

            if !self.polling.load(Ordering::Acquire) {
                break;
            }
        }
        debug!(adapter = %self.name, cycles = cycle, "poll loop finished");
    }

    async fn deliver(&self, cycle: u64, result: OperationResult) {
        let _delivery = self.delivery.lock().await;
        if !self.polling.load(Ordering::Acquire) {
            debug!(adapter = %self.name, cycle, "polling stopped, discarding cycle result");
            return;
        }

        let data = if result.is_success() {
            if !result.has_data() {
                trace!(adapter = %self.name, cycle, "poll returned no data");
                return;
            }
            result.data().cloned()
        } else {
            warn!(adapter = %self.name, cycle, reason = %result.message(), "poll cycle failed");
            None
        };

        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(callback) = callback else {
            debug!(adapter = %self.name, cycle, "no data callback registered");
            return;
        };

        if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(|| callback(data, result))) {
            error!(
                adapter = %self.name,
                cycle,
                panic = %panic_message(panic.as_ref()),
                "data callback panicked"
            );
        }
    }
}
