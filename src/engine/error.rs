//! Machine errors.

use crate::core::{StateId, TriggerId};
use thiserror::Error;

/// Broad class of a [`MachineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The machine was wired incorrectly: bad or duplicate state ids, or a
    /// resolver naming a state that does not exist.
    Configuration,
    /// The call is not valid in the machine's current lifecycle phase.
    IllegalState,
}

/// Errors reported by a machine.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MachineError {
    #[error("State {id} is already registered as '{name}'")]
    DuplicateState { id: StateId, name: String },

    #[error("The undefined state id cannot be registered")]
    UndefinedStateId,

    #[error("State {0} is not registered")]
    UnknownState(StateId),

    #[error("Resolver of state {from} mapped trigger {trigger} to unregistered state {target}")]
    UnregisteredTarget {
        from: StateId,
        trigger: TriggerId,
        target: StateId,
    },

    #[error("Machine has already been started")]
    AlreadyStarted,

    #[error("Machine has not been started. Call .start(state) before emitting triggers")]
    NotStarted,

    #[error("flush() cannot be called from a transition callback")]
    FlushFromWorker,

    #[error("flush() blocks the thread and cannot be called inside an async runtime. Use flush_async()")]
    FlushInRuntime,

    #[error("Machine halted: {reason}")]
    Halted { reason: String },
}

impl MachineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateState { .. }
            | Self::UndefinedStateId
            | Self::UnknownState(_)
            | Self::UnregisteredTarget { .. } => ErrorKind::Configuration,
            Self::AlreadyStarted
            | Self::NotStarted
            | Self::FlushFromWorker
            | Self::FlushInRuntime
            | Self::Halted { .. } => ErrorKind::IllegalState,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_illegal_state(&self) -> bool {
        self.kind() == ErrorKind::IllegalState
    }
}

pub type Result<T> = std::result::Result<T, MachineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiring_errors_are_configuration_errors() {
        assert!(MachineError::UndefinedStateId.is_configuration());
        assert!(MachineError::UnknownState(StateId::new(3)).is_configuration());
        assert!(MachineError::UnregisteredTarget {
            from: StateId::new(0),
            trigger: TriggerId::new(1),
            target: StateId::new(9),
        }
        .is_configuration());
    }

    #[test]
    fn lifecycle_errors_are_illegal_state_errors() {
        assert!(MachineError::AlreadyStarted.is_illegal_state());
        assert!(MachineError::NotStarted.is_illegal_state());
        assert!(MachineError::FlushInRuntime.is_illegal_state());
        assert_eq!(
            MachineError::Halted {
                reason: "boom".into()
            }
            .kind(),
            ErrorKind::IllegalState
        );
    }

    #[test]
    fn messages_name_the_offending_ids() {
        let err = MachineError::DuplicateState {
            id: StateId::new(1),
            name: "Click".into(),
        };
        assert_eq!(err.to_string(), "State 1 is already registered as 'Click'");
    }
}
