//! Adapter lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one adapter instance.
///
/// ```text
/// UNINITIALIZED -> INITIALIZING -> INITIALIZED -> STARTING -> RUNNING
///   -> STOPPING -> STOPPED -> SHUTTING_DOWN -> SHUT_DOWN
/// ```
///
/// `FAILED` is reachable from every transient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdapterState {
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    ShutDown,
    Failed,
}

impl AdapterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Initializing => "INITIALIZING",
            Self::Initialized => "INITIALIZED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::ShutDown => "SHUT_DOWN",
            Self::Failed => "FAILED",
        }
    }

    /// `SHUT_DOWN` is the only terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutDown)
    }

    /// States that only exist while a lifecycle hook is executing.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Initializing | Self::Starting | Self::Stopping | Self::ShuttingDown
        )
    }
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
