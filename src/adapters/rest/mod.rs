//! HTTP based adapters.

pub mod outbound;

pub use outbound::RestOutboundAdapter;
