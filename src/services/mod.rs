//! Runtime services shared by every protocol adapter.
//!
//! Lifecycle enforcement, the hook boundary, polling, batching and the
//! registry live here; protocol code stays in `crate::adapters`.

pub mod adapter_factory;
pub mod adapter_registry;
pub mod adapter_runtime;
pub mod batch_accumulator;
pub mod hook_boundary;
pub mod polling_scheduler;
pub mod processed_items;
pub mod state_machine;

pub use adapter_factory::AdapterFactory;
pub use adapter_registry::{AdapterRegistry, BulkOutcome};
pub use adapter_runtime::{AdapterRuntime, AdapterStatus};
pub use batch_accumulator::{BatchAccumulator, BatchWriter};
pub use polling_scheduler::{DataCallback, PollJob, PollingScheduler, DEFAULT_STOP_GRACE};
pub use processed_items::ProcessedItems;
pub use state_machine::StateMachine;
