//! Resolvers decide where a trigger leads.
//!
//! Every registered state owns a resolver. When a trigger arrives, the
//! engine asks the current state's resolver for a target. A resolver returns
//! either a state id or [`StateId::UNDEFINED`] ("no transition").
//!
//! Two implementations are provided:
//! - [`MapResolver`]: table lookup from trigger id to a state or to another
//!   resolver that is consulted in turn
//! - [`BlockResolver`]: runs a closure
//!
//! Both accept an optional parent. A parent is consulted only when the child
//! has nothing to say, so the first resolver in the chain (child before
//! parent) that yields a defined state wins. Chains must be acyclic; the
//! engine does not detect cycles.
//!
//! # Example
//!
//! ```rust
//! use trigger_fsm::core::{MachineSnapshot, StateId, Trigger, TriggerId};
//! use trigger_fsm::resolver::{child_map_resolver, map_resolver, Resolver};
//!
//! const RESET: TriggerId = TriggerId::new(0);
//! const NEXT: TriggerId = TriggerId::new(1);
//!
//! // Shared behaviour: RESET always goes back to state 0.
//! let common = map_resolver([(RESET, StateId::new(0))]);
//! // State specific: NEXT goes to 2, everything else falls back to `common`.
//! let specific = child_map_resolver(common, [(NEXT, StateId::new(2))]);
//!
//! let snapshot = MachineSnapshot::default();
//! assert_eq!(specific.resolve(&Trigger::new(NEXT), &snapshot), StateId::new(2));
//! assert_eq!(specific.resolve(&Trigger::new(RESET), &snapshot), StateId::new(0));
//! assert!(specific.resolve(&Trigger::new(7u64), &snapshot).is_undefined());
//! ```

mod block;
mod map;

pub use block::{block_resolver, child_block_resolver, BlockResolver, ResolveFn};
pub use map::{child_map_resolver, map_resolver, MapResolver, Route};

use crate::core::{MachineSnapshot, StateId, Trigger};
use std::sync::Arc;

/// Capability that maps a trigger to a target state.
///
/// Implementations must be side-effect free and terminate.
pub trait Resolver: Send + Sync {
    /// Resolve `trigger` against `machine`.
    ///
    /// Returns [`StateId::UNDEFINED`] when no transition should happen.
    fn resolve(&self, trigger: &Trigger, machine: &MachineSnapshot) -> StateId;
}

/// Resolver handle shared between states and child resolvers.
pub type SharedResolver = Arc<dyn Resolver>;

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, trigger: &Trigger, machine: &MachineSnapshot) -> StateId {
        (**self).resolve(trigger, machine)
    }
}

/// Consult `parent` if there is one, otherwise report no transition.
pub(crate) fn fall_back(
    parent: Option<&SharedResolver>,
    trigger: &Trigger,
    machine: &MachineSnapshot,
) -> StateId {
    parent.map_or(StateId::UNDEFINED, |p| p.resolve(trigger, machine))
}
