//! Identifier types for states and triggers.
//!
//! Both are thin wrappers around `u64`. Applications usually declare their
//! ids as enums (see [`fsm_ids!`](crate::fsm_ids)) and convert into these
//! types at the machine boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered state.
///
/// [`StateId::UNDEFINED`] is reserved: it is the machine's state before
/// `start`, and the value resolvers return to signal "no transition". It can
/// never be registered.
///
/// Ids are built through [`StateId::new`] or `From<u64>`:
///
/// ```compile_fail
/// let id = trigger_fsm::core::StateId(3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u64);

impl StateId {
    /// The "no such state" / "no transition" sentinel.
    pub const UNDEFINED: StateId = StateId(u64::MAX);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_undefined(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl From<u64> for StateId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("StateId(UNDEFINED)")
        } else {
            write!(f, "StateId({})", self.0)
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("undefined")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identifier of a trigger kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(u64);

impl TriggerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for TriggerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
