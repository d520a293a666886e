//! State records and the read-only machine view handed to resolvers.

use super::id::StateId;
use super::trigger::Trigger;
use crate::resolver::SharedResolver;
use std::fmt;

/// A registered state.
///
/// Records are created by `register_state` and never change afterwards. The
/// resolver is shared, so several states may point at the same instance.
#[derive(Clone)]
pub struct StateRecord {
    id: StateId,
    name: String,
    resolver: SharedResolver,
}

impl StateRecord {
    pub(crate) fn new(id: StateId, name: impl Into<String>, resolver: SharedResolver) -> Self {
        Self {
            id,
            name: name.into(),
            resolver,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolver(&self) -> &SharedResolver {
        &self.resolver
    }
}

impl fmt::Debug for StateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of a machine's position.
///
/// Before `start`, both states are [`StateId::UNDEFINED`] and no trigger has
/// been seen. `previous` stays undefined until the first transition.
#[derive(Clone, Debug, Default)]
pub struct MachineSnapshot {
    pub current: StateId,
    pub previous: StateId,
    pub last_trigger: Option<Trigger>,
}

impl MachineSnapshot {
    pub(crate) fn started_in(initial: StateId) -> Self {
        Self {
            current: initial,
            previous: StateId::UNDEFINED,
            last_trigger: None,
        }
    }

    pub fn is_started(&self) -> bool {
        !self.current.is_undefined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_unstarted() {
        let snapshot = MachineSnapshot::default();
        assert!(!snapshot.is_started());
        assert!(snapshot.previous.is_undefined());
        assert!(snapshot.last_trigger.is_none());
    }

    #[test]
    fn started_snapshot_has_no_previous_state() {
        let snapshot = MachineSnapshot::started_in(StateId::new(0));
        assert!(snapshot.is_started());
        assert_eq!(snapshot.current, StateId::new(0));
        assert_eq!(snapshot.previous, StateId::UNDEFINED);
    }
}
