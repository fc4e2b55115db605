//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output
//! - Rolling file output
//! - Secret scrubbing for every writer

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::{scrubber, ScrubbingMakeWriter, SecretScrubber};
