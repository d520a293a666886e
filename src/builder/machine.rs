//! Builder for constructing machines.

use crate::config::MachineConfig;
use crate::core::StateId;
use crate::engine::{Callback, Machine, Result};
use crate::listener::{OwnerKey, Scope};
use crate::resolver::SharedResolver;
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
///
/// Validation happens in [`build`](MachineBuilder::build): the first
/// duplicate or undefined state id aborts the build.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::builder::MachineBuilder;
/// use trigger_fsm::core::{StateId, TriggerId};
/// use trigger_fsm::resolver::map_resolver;
///
/// const OFF: StateId = StateId::new(0);
/// const ON: StateId = StateId::new(1);
/// const TOGGLE: TriggerId = TriggerId::new(0);
///
/// let machine = MachineBuilder::new()
///     .name("switch")
///     .state(OFF, "Off", map_resolver([(TOGGLE, ON)]))
///     .state(ON, "On", map_resolver([(TOGGLE, OFF)]))
///     .start(OFF)
///     .unwrap();
///
/// machine.emit_trigger(TOGGLE).unwrap();
/// machine.flush().unwrap();
/// assert_eq!(machine.state(), ON);
/// ```
pub struct MachineBuilder {
    config: MachineConfig,
    states: Vec<(StateId, String, SharedResolver)>,
    listeners: Vec<(Scope, OwnerKey, Callback)>,
    debug_hook: Option<Callback>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            states: Vec::new(),
            listeners: Vec::new(),
            debug_hook: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Add a state.
    pub fn state(
        mut self,
        id: impl Into<StateId>,
        name: impl Into<String>,
        resolver: SharedResolver,
    ) -> Self {
        self.states.push((id.into(), name.into(), resolver));
        self
    }

    pub fn on_transition_call<F>(self, callback: F, owner: OwnerKey) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.listener(Scope::Any, callback, owner)
    }

    pub fn on_leaving<F>(self, state: impl Into<StateId>, callback: F, owner: OwnerKey) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.listener(Scope::Leaving(state.into()), callback, owner)
    }

    pub fn on_entering<F>(self, state: impl Into<StateId>, callback: F, owner: OwnerKey) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.listener(Scope::Entering(state.into()), callback, owner)
    }

    pub fn on_leaving_entering<F>(
        self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        callback: F,
        owner: OwnerKey,
    ) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.listener(Scope::Between(from.into(), to.into()), callback, owner)
    }

    fn listener<F>(mut self, scope: Scope, callback: F, owner: OwnerKey) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.listeners.push((scope, owner, Arc::new(callback)));
        self
    }

    pub fn debug_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.debug_hook = Some(Arc::new(hook));
        self
    }

    /// Build the machine without starting it.
    pub fn build(self) -> Result<Machine> {
        let machine = Machine::with_config(self.config);
        for (id, name, resolver) in self.states {
            machine.register_state(id, name, resolver)?;
        }
        for (scope, owner, callback) in self.listeners {
            machine.add_listener(scope, callback, owner);
        }
        if let Some(hook) = self.debug_hook {
            machine.set_debug_callback(hook);
        }
        Ok(machine)
    }

    /// Build the machine and start it in `initial`.
    pub fn start(self, initial: impl Into<StateId>) -> Result<Machine> {
        let machine = self.build()?;
        machine.start(initial)?;
        Ok(machine)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
