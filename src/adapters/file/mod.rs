//! Local file system adapters.

pub mod inbound;
pub mod outbound;
pub mod pattern;

pub use inbound::FileInboundAdapter;
pub use outbound::FileOutboundAdapter;
pub use pattern::FilePattern;
