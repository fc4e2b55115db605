//! Built-in protocol adapters.
//!
//! Each adapter implements [`ProtocolAdapter`](crate::domain::ports::ProtocolAdapter)
//! and is created by the [`AdapterFactory`](crate::services::AdapterFactory).

pub mod file;
pub mod rest;

pub use file::{FileInboundAdapter, FileOutboundAdapter};
pub use rest::RestOutboundAdapter;
