//! Domain layer for the Switchyard adapter runtime
//!
//! Models, error taxonomy and the capability port every protocol adapter
//! implements. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{AdapterError, AdapterResult};
