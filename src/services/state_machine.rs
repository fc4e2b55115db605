//! Lifecycle state owned by one adapter runtime.

use std::sync::{Mutex, PoisonError};

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::AdapterState;

/// Guarded lifecycle state.
///
/// A lifecycle operation first calls [`begin`](Self::begin), which checks
/// the current state and moves into the operation's transient state, then
/// [`settle`](Self::settle) once the hook has returned.
#[derive(Debug)]
pub struct StateMachine {
    state: Mutex<AdapterState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AdapterState::Uninitialized),
        }
    }

    pub fn current(&self) -> AdapterState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail with `IllegalState` unless the current state is in `allowed`.
    pub fn require(&self, operation: &str, allowed: &[AdapterState]) -> AdapterResult<AdapterState> {
        let current = self.current();
        if allowed.contains(&current) {
            Ok(current)
        } else {
            Err(AdapterError::IllegalState {
                operation: operation.to_string(),
                state: current,
            })
        }
    }

    /// Move into `transient` if the current state is in `allowed`.
    ///
    /// Returns the state that was left.
    pub fn begin(
        &self,
        operation: &str,
        allowed: &[AdapterState],
        transient: AdapterState,
    ) -> AdapterResult<AdapterState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !allowed.contains(&state) {
            return Err(AdapterError::IllegalState {
                operation: operation.to_string(),
                state: *state,
            });
        }
        let previous = *state;
        *state = transient;
        Ok(previous)
    }

    /// Record the outcome of the operation in progress.
    pub fn settle(&self, to: AdapterState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uninitialized() {
        assert_eq!(StateMachine::new().current(), AdapterState::Uninitialized);
    }

    #[test]
    fn test_begin_and_settle() {
        let machine = StateMachine::new();
        let previous = machine
            .begin(
                "initialize",
                &[AdapterState::Uninitialized, AdapterState::Failed],
                AdapterState::Initializing,
            )
            .unwrap();
        assert_eq!(previous, AdapterState::Uninitialized);
        assert_eq!(machine.current(), AdapterState::Initializing);

        machine.settle(AdapterState::Initialized);
        assert_eq!(machine.current(), AdapterState::Initialized);
    }

    #[test]
    fn test_begin_rejects_illegal_state() {
        let machine = StateMachine::new();
        let err = machine
            .begin("start", &[AdapterState::Initialized], AdapterState::Starting)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot start while adapter is UNINITIALIZED");
        assert_eq!(machine.current(), AdapterState::Uninitialized);
    }

    #[test]
    fn test_require_does_not_transition() {
        let machine = StateMachine::new();
        machine.settle(AdapterState::Running);
        assert!(machine.require("send", &[AdapterState::Running]).is_ok());
        assert!(machine.require("test connection", &[AdapterState::Initialized]).is_err());
        assert_eq!(machine.current(), AdapterState::Running);
    }
}
