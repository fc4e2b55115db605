//! Runtime configuration loading
//!
//! Layers programmatic defaults, `switchyard.yaml`, an optional
//! `switchyard.local.yaml` and `SWITCHYARD_*` environment variables, then
//! validates every adapter definition before anything is built.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
