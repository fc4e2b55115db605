//! Port trait definitions (Hexagonal Architecture)
//!
//! The runtime talks to protocol-specific code exclusively through
//! [`ProtocolAdapter`], keeping lifecycle, polling and batching independent
//! of any wire protocol.

pub mod adapter;

pub use adapter::{CheckFuture, ConnectionCheck, ProtocolAdapter};
