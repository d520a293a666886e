//! Transition listener bookkeeping.
//!
//! Listeners are registered under a [`Scope`] and tagged with an
//! [`OwnerKey`]. The registry never calls anything itself: the engine asks
//! it for a [`snapshot`](ListenerRegistry::snapshot) of the callbacks that
//! match a transition and invokes them outside the registry lock. Changes
//! made while a snapshot is being dispatched only affect later transitions.

use crate::core::StateId;
use std::fmt;
use uuid::Uuid;

/// Opaque token grouping listeners for bulk removal.
///
/// The registry stores and compares owner keys but attaches no meaning to
/// them. Mint a fresh one per owning component with [`OwnerKey::new`].
/// Keys only live inside the process and are not serializable:
///
/// ```compile_fail
/// let key = trigger_fsm::OwnerKey::new();
/// serde_json::to_string(&key).unwrap();
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerKey(Uuid);

impl OwnerKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Owner key from a caller chosen value.
    pub const fn from_raw(raw: u128) -> Self {
        Self(Uuid::from_u128(raw))
    }
}

impl Default for OwnerKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerKey({})", self.0)
    }
}

/// Which transitions a listener cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every transition.
    Any,
    /// Transitions out of the given state.
    Leaving(StateId),
    /// Transitions into the given state.
    Entering(StateId),
    /// Transitions from the first state to the second.
    Between(StateId, StateId),
}

struct Entry<C> {
    scope: Scope,
    owner: OwnerKey,
    callback: C,
}

/// Ordered collection of listeners plus the optional debug hook.
///
/// Generic over the callback handle `C`, which only needs to be cheap to
/// clone (the engine uses `Arc<dyn Fn ..>`).
pub struct ListenerRegistry<C> {
    entries: Vec<Entry<C>>,
    debug_hook: Option<C>,
}

impl<C: Clone> ListenerRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            debug_hook: None,
        }
    }

    /// Add a listener after all existing ones.
    pub fn register(&mut self, scope: Scope, owner: OwnerKey, callback: C) {
        self.entries.push(Entry {
            scope,
            owner,
            callback,
        });
    }

    /// Remove every listener registered under `owner`, in any scope.
    ///
    /// Returns how many listeners were removed. The relative order of the
    /// remaining listeners is unchanged.
    pub fn remove_owned_by(&mut self, owner: OwnerKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.owner != owner);
        before - self.entries.len()
    }

    pub fn set_debug_hook(&mut self, hook: C) {
        self.debug_hook = Some(hook);
    }

    pub fn clear_debug_hook(&mut self) -> Option<C> {
        self.debug_hook.take()
    }

    pub fn has_debug_hook(&self) -> bool {
        self.debug_hook.is_some()
    }

    /// Callbacks to run for a transition from `leaving` to `entering`.
    ///
    /// Order: `Leaving(leaving)`, `Between(leaving, entering)`,
    /// `Entering(entering)`, `Any`, each group in registration order, and
    /// the debug hook last.
    pub fn snapshot(&self, leaving: StateId, entering: StateId) -> Vec<C> {
        let groups = [
            Scope::Leaving(leaving),
            Scope::Between(leaving, entering),
            Scope::Entering(entering),
            Scope::Any,
        ];

        let mut callbacks: Vec<C> = groups
            .iter()
            .flat_map(|group| {
                self.entries
                    .iter()
                    .filter(move |entry| entry.scope == *group)
                    .map(|entry| entry.callback.clone())
            })
            .collect();
        callbacks.extend(self.debug_hook.iter().cloned());
        callbacks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Clone> Default for ListenerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ListenerRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .field("has_debug_hook", &self.debug_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: StateId = StateId::new(0);
    const B: StateId = StateId::new(1);
    const C: StateId = StateId::new(2);

    #[test]
    fn snapshot_orders_scopes() {
        let owner = OwnerKey::new();
        let mut registry = ListenerRegistry::new();
        // Registered in reverse of dispatch order on purpose.
        registry.set_debug_hook("debug");
        registry.register(Scope::Any, owner, "any");
        registry.register(Scope::Entering(B), owner, "entering");
        registry.register(Scope::Between(A, B), owner, "between");
        registry.register(Scope::Leaving(A), owner, "leaving");

        assert_eq!(
            registry.snapshot(A, B),
            vec!["leaving", "between", "entering", "any", "debug"]
        );
    }

    #[test]
    fn snapshot_keeps_registration_order_within_scope() {
        let owner = OwnerKey::new();
        let mut registry = ListenerRegistry::new();
        registry.register(Scope::Leaving(A), owner, "first");
        registry.register(Scope::Leaving(A), owner, "second");
        registry.register(Scope::Leaving(A), owner, "third");

        assert_eq!(registry.snapshot(A, B), vec!["first", "second", "third"]);
    }

    #[test]
    fn snapshot_skips_unrelated_scopes() {
        let owner = OwnerKey::new();
        let mut registry = ListenerRegistry::new();
        registry.register(Scope::Leaving(B), owner, "leaving b");
        registry.register(Scope::Entering(A), owner, "entering a");
        registry.register(Scope::Between(A, C), owner, "a to c");
        registry.register(Scope::Between(A, B), owner, "a to b");

        assert_eq!(registry.snapshot(A, B), vec!["a to b"]);
        assert!(registry.snapshot(C, A).contains(&"entering a"));
    }

    #[test]
    fn remove_owned_by_only_touches_that_owner() {
        let first = OwnerKey::new();
        let second = OwnerKey::new();
        let mut registry = ListenerRegistry::new();
        registry.register(Scope::Leaving(A), first, "l1");
        registry.register(Scope::Leaving(A), second, "l2");
        registry.register(Scope::Any, first, "any1");
        registry.register(Scope::Any, second, "any2");
        registry.register(Scope::Entering(B), second, "e2");

        assert_eq!(registry.remove_owned_by(first), 2);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.snapshot(A, B), vec!["l2", "e2", "any2"]);
        assert_eq!(registry.remove_owned_by(first), 0);
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let owner = OwnerKey::new();
        let mut registry = ListenerRegistry::new();
        registry.register(Scope::Any, owner, "kept");

        let snapshot = registry.snapshot(A, B);
        registry.remove_owned_by(owner);

        assert_eq!(snapshot, vec!["kept"]);
        assert!(registry.snapshot(A, B).is_empty());
    }

    #[test]
    fn debug_hook_can_be_cleared() {
        let mut registry: ListenerRegistry<&str> = ListenerRegistry::new();
        registry.set_debug_hook("debug");
        assert!(registry.has_debug_hook());
        assert_eq!(registry.clear_debug_hook(), Some("debug"));
        assert!(registry.snapshot(A, B).is_empty());
    }

    #[test]
    fn raw_owner_keys_compare_by_value() {
        assert_eq!(OwnerKey::from_raw(7), OwnerKey::from_raw(7));
        assert_ne!(OwnerKey::from_raw(7), OwnerKey::from_raw(8));
        assert_ne!(OwnerKey::new(), OwnerKey::new());
    }
}
