//! Table driven resolver.

use super::{fall_back, Resolver, SharedResolver};
use crate::core::{MachineSnapshot, StateId, Trigger, TriggerId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Where a mapped trigger leads.
#[derive(Clone)]
pub enum Route {
    /// Go directly to a state.
    Goto(StateId),
    /// Ask another resolver and use its answer.
    Consult(SharedResolver),
}

impl From<StateId> for Route {
    fn from(state: StateId) -> Self {
        Route::Goto(state)
    }
}

impl From<SharedResolver> for Route {
    fn from(resolver: SharedResolver) -> Self {
        Route::Consult(resolver)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Goto(state) => f.debug_tuple("Goto").field(state).finish(),
            Route::Consult(_) => f.write_str("Consult(..)"),
        }
    }
}

/// Resolver backed by a trigger id lookup table.
///
/// A trigger found in the table resolves to its route: either a state, or
/// the answer of the consulted resolver (which may itself be undefined; the
/// parent is not asked in that case). A trigger missing from the table is
/// handed to the parent, if any.
///
/// Routes can be added after the resolver has been shared with a machine.
/// The table is guarded by a lock, so concurrent additions are safe, but
/// they race with in-flight resolutions; configure before emitting.
pub struct MapResolver {
    parent: Option<SharedResolver>,
    routes: RwLock<HashMap<TriggerId, Route>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self {
            parent: None,
            routes: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_parent(parent: SharedResolver) -> Self {
        Self {
            parent: Some(parent),
            routes: RwLock::new(HashMap::new()),
        }
    }

    /// Build a resolver from `(trigger, route)` pairs.
    pub fn from_routes<I, R>(parent: Option<SharedResolver>, routes: I) -> Self
    where
        I: IntoIterator<Item = (TriggerId, R)>,
        R: Into<Route>,
    {
        Self {
            parent,
            routes: RwLock::new(routes.into_iter().map(|(t, r)| (t, r.into())).collect()),
        }
    }

    /// Map `trigger` directly to `state`, replacing any previous route.
    pub fn on(&self, trigger: impl Into<TriggerId>, state: impl Into<StateId>) -> &Self {
        self.routes
            .write()
            .insert(trigger.into(), Route::Goto(state.into()));
        self
    }

    /// Map `trigger` to a consultant resolver, replacing any previous route.
    pub fn consult(&self, trigger: impl Into<TriggerId>, resolver: SharedResolver) -> &Self {
        self.routes
            .write()
            .insert(trigger.into(), Route::Consult(resolver));
        self
    }

    pub fn route(&self, trigger: TriggerId) -> Option<Route> {
        self.routes.read().get(&trigger).cloned()
    }

    pub fn parent(&self) -> Option<&SharedResolver> {
        self.parent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}

impl Default for MapResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, trigger: &Trigger, machine: &MachineSnapshot) -> StateId {
        // Clone the route out so the lock is not held while a consultant runs.
        match self.route(trigger.id()) {
            Some(Route::Goto(state)) => state,
            Some(Route::Consult(consultant)) => consultant.resolve(trigger, machine),
            None => fall_back(self.parent.as_ref(), trigger, machine),
        }
    }
}

impl fmt::Debug for MapResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapResolver")
            .field("routes", &*self.routes.read())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Shortcut for a parentless [`MapResolver`].
pub fn map_resolver<I, R>(routes: I) -> Arc<MapResolver>
where
    I: IntoIterator<Item = (TriggerId, R)>,
    R: Into<Route>,
{
    Arc::new(MapResolver::from_routes(None, routes))
}

/// Shortcut for a [`MapResolver`] that falls back to `parent`.
pub fn child_map_resolver<I, R>(parent: SharedResolver, routes: I) -> Arc<MapResolver>
where
    I: IntoIterator<Item = (TriggerId, R)>,
    R: Into<Route>,
{
    Arc::new(MapResolver::from_routes(Some(parent), routes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::block_resolver;

    const T1: TriggerId = TriggerId::new(10);
    const T2: TriggerId = TriggerId::new(20);
    const A: StateId = StateId::new(0);
    const B: StateId = StateId::new(1);
    const C: StateId = StateId::new(2);

    fn resolve(resolver: &dyn Resolver, trigger: TriggerId) -> StateId {
        resolver.resolve(&Trigger::new(trigger), &MachineSnapshot::default())
    }

    #[test]
    fn direct_route_resolves_to_state() {
        let resolver = map_resolver([(T1, B)]);
        assert_eq!(resolve(&*resolver, T1), B);
    }

    #[test]
    fn unknown_trigger_without_parent_is_undefined() {
        let resolver = MapResolver::new();
        assert!(resolve(&resolver, T1).is_undefined());
    }

    #[test]
    fn missing_route_falls_back_to_parent() {
        let parent = map_resolver([(T2, C)]);
        let child = child_map_resolver(parent, [(T1, B)]);

        assert_eq!(resolve(&*child, T2), C);
        assert_eq!(resolve(&*child, T1), B);
    }

    #[test]
    fn child_route_shadows_parent() {
        let parent = map_resolver([(T1, C)]);
        let child = child_map_resolver(parent, [(T1, B)]);
        assert_eq!(resolve(&*child, T1), B);
    }

    #[test]
    fn consultant_answer_is_returned() {
        let consultant = block_resolver(|trigger, _| match trigger.attachment::<bool>() {
            Some(true) => StateId::new(1),
            _ => StateId::new(2),
        });
        let resolver = map_resolver([(T1, Route::Consult(consultant))]);

        let yes = Trigger::with_attachment(T1, true);
        let no = Trigger::with_attachment(T1, false);
        let snapshot = MachineSnapshot::default();
        assert_eq!(resolver.resolve(&yes, &snapshot), B);
        assert_eq!(resolver.resolve(&no, &snapshot), C);
    }

    #[test]
    fn undefined_consultant_answer_does_not_reach_parent() {
        let parent = map_resolver([(T1, C)]);
        let consultant = block_resolver(|_, _| StateId::UNDEFINED);
        let child = child_map_resolver(parent, [(T1, Route::Consult(consultant))]);

        assert!(resolve(&*child, T1).is_undefined());
    }

    #[test]
    fn routes_can_be_added_after_sharing() {
        let resolver = map_resolver(Vec::<(TriggerId, StateId)>::new());
        let shared: SharedResolver = resolver.clone();
        assert!(resolve(&*shared, T1).is_undefined());

        resolver.on(T1, B).on(T2, C);
        assert_eq!(resolve(&*shared, T1), B);
        assert_eq!(resolve(&*shared, T2), C);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn later_route_replaces_earlier_one() {
        let resolver = MapResolver::new();
        resolver.on(T1, B);
        resolver.consult(T1, map_resolver([(T1, A)]));

        assert!(matches!(resolver.route(T1), Some(Route::Consult(_))));
        assert_eq!(resolve(&resolver, T1), A);
    }
}
