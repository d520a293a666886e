//! The machine handle and its transition step.

use super::error::{MachineError, Result};
use super::worker::{self, Command};
use crate::config::MachineConfig;
use crate::core::{
    MachineSnapshot, StateId, StateRecord, TransitionLog, TransitionRecord, Trigger, TriggerId,
};
use crate::listener::{ListenerRegistry, OwnerKey, Scope};
use crate::resolver::SharedResolver;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

/// Transition callback. Receives the machine after the transition has been
/// committed, so `state()` is the entered state and `previous_state()` the
/// one that was left.
pub type Callback = Arc<dyn Fn(&Machine) + Send + Sync>;

pub(super) struct Shared {
    config: MachineConfig,
    states: RwLock<HashMap<StateId, StateRecord>>,
    position: RwLock<MachineSnapshot>,
    history: Mutex<TransitionLog>,
    listeners: Mutex<ListenerRegistry<Callback>>,
    queue: RwLock<Option<mpsc::UnboundedSender<Command>>>,
    worker: Mutex<Option<ThreadId>>,
    fault: Mutex<Option<MachineError>>,
}

impl Shared {
    pub(super) fn name(&self) -> &str {
        &self.config.name
    }

    pub(super) fn record_fault(&self, error: MachineError) {
        self.fault.lock().get_or_insert(error);
    }
}

/// A trigger driven finite state machine.
///
/// `Machine` is a cheap handle: clones share the same states, listeners and
/// queue. Triggers are processed one at a time, in arrival order, on a
/// dedicated worker thread started by [`start`](Machine::start). Emitting
/// never blocks on that processing.
///
/// Dropping the last handle drops every pending trigger and listener and
/// lets the worker thread exit. Callbacks get the machine as an argument;
/// a callback that captures its own handle keeps the machine alive.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{StateId, TriggerId};
/// use trigger_fsm::resolver::map_resolver;
/// use trigger_fsm::Machine;
///
/// const IDLE: StateId = StateId::new(0);
/// const RUNNING: StateId = StateId::new(1);
/// const GO: TriggerId = TriggerId::new(10);
///
/// let machine = Machine::new();
/// machine.register_state(IDLE, "Idle", map_resolver([(GO, RUNNING)])).unwrap();
/// machine.register_state(RUNNING, "Running", map_resolver(Vec::<(TriggerId, StateId)>::new())).unwrap();
///
/// machine.start(IDLE).unwrap();
/// machine.emit_trigger(GO).unwrap();
/// machine.flush().unwrap();
///
/// assert_eq!(machine.state(), RUNNING);
/// assert_eq!(machine.previous_state(), IDLE);
/// ```
#[derive(Clone)]
pub struct Machine {
    shared: Arc<Shared>,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        let history = TransitionLog::with_capacity(config.history_capacity);
        Self {
            shared: Arc::new(Shared {
                config,
                states: RwLock::new(HashMap::new()),
                position: RwLock::new(MachineSnapshot::default()),
                history: Mutex::new(history),
                listeners: Mutex::new(ListenerRegistry::new()),
                queue: RwLock::new(None),
                worker: Mutex::new(None),
                fault: Mutex::new(None),
            }),
        }
    }

    pub(super) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn name(&self) -> &str {
        self.shared.name()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.shared.config
    }

    // --- states ---

    /// Register a state with the resolver that decides where its triggers
    /// lead.
    ///
    /// Registration is meant to be finished before the first trigger is
    /// emitted. Registering later is allowed but races with in-flight
    /// resolutions.
    pub fn register_state(
        &self,
        id: impl Into<StateId>,
        name: impl Into<String>,
        resolver: SharedResolver,
    ) -> Result<()> {
        let id = id.into();
        if id.is_undefined() {
            return Err(MachineError::UndefinedStateId);
        }

        let mut states = self.shared.states.write();
        if let Some(existing) = states.get(&id) {
            return Err(MachineError::DuplicateState {
                id,
                name: existing.name().to_string(),
            });
        }

        let record = StateRecord::new(id, name, resolver);
        debug!(machine = %self.name(), state = %id, name = record.name(), "registered state");
        states.insert(id, record);
        Ok(())
    }

    pub fn has_state(&self, id: impl Into<StateId>) -> bool {
        self.shared.states.read().contains_key(&id.into())
    }

    pub fn name_for_state(&self, id: impl Into<StateId>) -> Result<String> {
        let id = id.into();
        self.shared
            .states
            .read()
            .get(&id)
            .map(|record| record.name().to_string())
            .ok_or(MachineError::UnknownState(id))
    }

    pub fn state_count(&self) -> usize {
        self.shared.states.read().len()
    }

    // --- lifecycle ---

    /// Put the machine in `initial` and start processing triggers.
    ///
    /// No listener and no debug hook runs for the initial state.
    pub fn start(&self, initial: impl Into<StateId>) -> Result<()> {
        let initial = initial.into();
        let mut queue = self.shared.queue.write();
        if queue.is_some() {
            return Err(MachineError::AlreadyStarted);
        }
        if !self.has_state(initial) {
            return Err(MachineError::UnknownState(initial));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = worker::spawn(
            self.shared.config.thread_name(),
            Arc::downgrade(&self.shared),
            rx,
        )
        .map_err(|e| MachineError::Halted {
            reason: format!("failed to spawn worker thread: {e}"),
        })?;

        *self.shared.position.write() = MachineSnapshot::started_in(initial);
        *self.shared.worker.lock() = Some(handle.thread().id());
        *queue = Some(tx);

        debug!(machine = %self.name(), state = %initial, "machine started");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.shared.queue.read().is_some()
    }

    /// The error that halted the worker, if any.
    pub fn fault(&self) -> Option<MachineError> {
        self.shared.fault.lock().clone()
    }

    // --- triggers ---

    /// Queue a trigger with no attachment.
    pub fn emit_trigger(&self, id: impl Into<TriggerId>) -> Result<()> {
        self.emit(Trigger::new(id))
    }

    /// Queue a trigger carrying `attachment`.
    pub fn emit_trigger_with<T>(&self, id: impl Into<TriggerId>, attachment: T) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        self.emit(Trigger::with_attachment(id, attachment))
    }

    /// Queue a trigger and return immediately.
    ///
    /// Triggers emitted from one thread are processed in emission order.
    pub fn emit(&self, trigger: Trigger) -> Result<()> {
        let queue = self.shared.queue.read();
        let tx = queue.as_ref().ok_or(MachineError::NotStarted)?;
        if let Some(fault) = self.fault() {
            return Err(halted_by(&fault));
        }

        trace!(machine = %self.name(), trigger = %trigger.id(), "trigger queued");
        tx.send(Command::Trigger(trigger))
            .map_err(|_| self.halted())
    }

    /// Block until every trigger emitted before this call has been
    /// processed.
    ///
    /// Returns the machine's fault if processing stopped. Calling it from a
    /// transition callback returns [`MachineError::FlushFromWorker`]; calling
    /// it inside a tokio runtime returns [`MachineError::FlushInRuntime`]
    /// (use [`flush_async`](Machine::flush_async) there).
    pub fn flush(&self) -> Result<()> {
        if Handle::try_current().is_ok() {
            return Err(MachineError::FlushInRuntime);
        }
        let completed = match self.request_flush()? {
            Some(done) => done.blocking_recv().is_ok(),
            None => true,
        };
        self.settle(completed)
    }

    /// Async variant of [`flush`](Machine::flush).
    pub async fn flush_async(&self) -> Result<()> {
        let completed = match self.request_flush()? {
            Some(done) => done.await.is_ok(),
            None => true,
        };
        self.settle(completed)
    }

    fn request_flush(&self) -> Result<Option<oneshot::Receiver<()>>> {
        if *self.shared.worker.lock() == Some(thread::current().id()) {
            return Err(MachineError::FlushFromWorker);
        }
        let queue = self.shared.queue.read();
        let Some(tx) = queue.as_ref() else {
            return Ok(None);
        };
        self.check_fault()?;

        let (done_tx, done_rx) = oneshot::channel();
        tx.send(Command::Flush(done_tx))
            .map_err(|_| self.halted())?;
        Ok(Some(done_rx))
    }

    /// Outcome of a flush: the machine's own fault wins over the generic
    /// "worker stopped" error.
    fn settle(&self, completed: bool) -> Result<()> {
        self.check_fault()?;
        if completed {
            Ok(())
        } else {
            Err(self.halted())
        }
    }

    fn check_fault(&self) -> Result<()> {
        match self.fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn halted(&self) -> MachineError {
        match self.fault() {
            Some(fault) => halted_by(&fault),
            None => MachineError::Halted {
                reason: "worker stopped".to_string(),
            },
        }
    }

    // --- position ---

    pub fn state(&self) -> StateId {
        self.shared.position.read().current
    }

    pub fn previous_state(&self) -> StateId {
        self.shared.position.read().previous
    }

    /// The trigger that caused the most recent transition.
    pub fn triggered_by(&self) -> Option<Trigger> {
        self.shared.position.read().last_trigger.clone()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        self.shared.position.read().clone()
    }

    /// Recently committed transitions, oldest first.
    pub fn history(&self) -> TransitionLog {
        self.shared.history.lock().clone()
    }

    // --- listeners ---

    /// Call `callback` on every transition.
    pub fn on_transition_call<F>(&self, callback: F, owner: OwnerKey)
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.add_listener(Scope::Any, Arc::new(callback), owner);
    }

    /// Call `callback` whenever the machine leaves `state`.
    pub fn on_leaving<F>(&self, state: impl Into<StateId>, callback: F, owner: OwnerKey)
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.add_listener(Scope::Leaving(state.into()), Arc::new(callback), owner);
    }

    /// Call `callback` whenever the machine enters `state`.
    pub fn on_entering<F>(&self, state: impl Into<StateId>, callback: F, owner: OwnerKey)
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.add_listener(Scope::Entering(state.into()), Arc::new(callback), owner);
    }

    /// Call `callback` on transitions from `from` to `to`.
    pub fn on_leaving_entering<F>(
        &self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        callback: F,
        owner: OwnerKey,
    ) where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.add_listener(
            Scope::Between(from.into(), to.into()),
            Arc::new(callback),
            owner,
        );
    }

    pub(crate) fn add_listener(&self, scope: Scope, callback: Callback, owner: OwnerKey) {
        self.shared.listeners.lock().register(scope, owner, callback);
    }

    /// Remove every listener registered with `owner`. Returns how many were
    /// removed.
    ///
    /// Safe to call from a callback: the transition being dispatched keeps
    /// its listener list, the change applies from the next transition on.
    pub fn remove_listeners_owned_by(&self, owner: OwnerKey) -> usize {
        let removed = self.shared.listeners.lock().remove_owned_by(owner);
        debug!(machine = %self.name(), ?owner, removed, "removed listeners");
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    /// Install a hook run after all listeners of every transition.
    pub fn set_debug_hook<F>(&self, hook: F)
    where
        F: Fn(&Machine) + Send + Sync + 'static,
    {
        self.set_debug_callback(Arc::new(hook));
    }

    pub(crate) fn set_debug_callback(&self, hook: Callback) {
        self.shared.listeners.lock().set_debug_hook(hook);
    }

    pub fn clear_debug_hook(&self) {
        self.shared.listeners.lock().clear_debug_hook();
    }

    // --- transition step ---

    /// Resolve one trigger and, if it leads somewhere, commit the transition
    /// and run the matching callbacks.
    ///
    /// Returns `Ok(None)` when the resolver chain answered undefined. The
    /// target is validated before anything is mutated, so an error leaves
    /// the machine exactly as it was.
    pub(super) fn process(&self, trigger: Trigger) -> Result<Option<TransitionRecord>> {
        let snapshot = self.snapshot();
        let from = snapshot.current;
        let resolver = self
            .shared
            .states
            .read()
            .get(&from)
            .map(|record| Arc::clone(record.resolver()))
            .ok_or(MachineError::UnknownState(from))?;

        let target = resolver.resolve(&trigger, &snapshot);
        if target.is_undefined() {
            debug!(machine = %self.name(), state = %from, trigger = %trigger.id(), "trigger ignored");
            return Ok(None);
        }
        if !self.has_state(target) {
            return Err(MachineError::UnregisteredTarget {
                from,
                trigger: trigger.id(),
                target,
            });
        }

        let record = TransitionRecord {
            from,
            to: target,
            trigger: trigger.id(),
            timestamp: Utc::now(),
        };
        {
            let mut position = self.shared.position.write();
            position.previous = from;
            position.current = target;
            position.last_trigger = Some(trigger);
        }
        self.shared.history.lock().record(record.clone());

        let callbacks = self.shared.listeners.lock().snapshot(from, target);
        debug!(
            machine = %self.name(),
            from = %from,
            to = %target,
            trigger = %record.trigger,
            callbacks = callbacks.len(),
            "transition"
        );
        for callback in callbacks {
            callback(self);
        }

        Ok(Some(record))
    }
}

fn halted_by(fault: &MachineError) -> MachineError {
    match fault {
        MachineError::Halted { .. } => fault.clone(),
        other => MachineError::Halted {
            reason: other.to_string(),
        },
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.shared.position.read();
        f.debug_struct("Machine")
            .field("name", &self.name())
            .field("state", &position.current)
            .field("previous_state", &position.previous)
            .field("states", &self.shared.states.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{block_resolver, map_resolver};

    const A: StateId = StateId::new(0);
    const B: StateId = StateId::new(1);
    const T1: TriggerId = TriggerId::new(10);

    fn two_state_machine() -> Machine {
        let machine = Machine::new();
        machine
            .register_state(A, "A", map_resolver([(T1, B)]))
            .unwrap();
        machine
            .register_state(B, "B", map_resolver([(T1, A)]))
            .unwrap();
        machine
    }

    #[test]
    fn duplicate_registration_keeps_original_record() {
        let machine = two_state_machine();
        let err = machine
            .register_state(A, "Other", map_resolver([(T1, A)]))
            .unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(machine.name_for_state(A).unwrap(), "A");
        assert_eq!(machine.state_count(), 2);
    }

    #[test]
    fn undefined_id_cannot_be_registered() {
        let machine = Machine::new();
        let err = machine
            .register_state(StateId::UNDEFINED, "nowhere", block_resolver(|_, _| A))
            .unwrap_err();
        assert_eq!(err, MachineError::UndefinedStateId);
        assert!(!machine.has_state(StateId::UNDEFINED));
    }

    #[test]
    fn unknown_state_name_is_a_configuration_error() {
        let machine = two_state_machine();
        assert_eq!(
            machine.name_for_state(StateId::new(5)),
            Err(MachineError::UnknownState(StateId::new(5)))
        );
    }

    #[test]
    fn unstarted_machine_is_undefined() {
        let machine = two_state_machine();
        assert!(!machine.is_started());
        assert!(machine.state().is_undefined());
        assert!(machine.previous_state().is_undefined());
        assert!(machine.triggered_by().is_none());
    }

    #[test]
    fn emitting_before_start_is_rejected() {
        let machine = two_state_machine();
        assert_eq!(machine.emit_trigger(T1), Err(MachineError::NotStarted));
    }

    #[test]
    fn start_requires_registered_state() {
        let machine = two_state_machine();
        let err = machine.start(StateId::new(9)).unwrap_err();
        assert!(err.is_configuration());
        assert!(!machine.is_started());
    }

    #[test]
    fn start_only_once() {
        let machine = two_state_machine();
        machine.start(A).unwrap();
        assert_eq!(machine.start(B), Err(MachineError::AlreadyStarted));
        assert_eq!(machine.state(), A);
    }

    #[test]
    fn process_commits_transition_and_records_history() {
        let machine = two_state_machine();
        machine.start(A).unwrap();

        let record = machine.process(Trigger::new(T1)).unwrap().unwrap();
        assert_eq!((record.from, record.to), (A, B));
        assert_eq!(machine.state(), B);
        assert_eq!(machine.previous_state(), A);
        assert_eq!(machine.triggered_by().map(|t| t.id()), Some(T1));
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn process_rejects_unregistered_target_without_mutation() {
        let machine = Machine::new();
        machine
            .register_state(A, "A", block_resolver(|_, _| StateId::new(42)))
            .unwrap();
        machine.start(A).unwrap();

        let err = machine.process(Trigger::new(T1)).unwrap_err();
        assert_eq!(
            err,
            MachineError::UnregisteredTarget {
                from: A,
                trigger: T1,
                target: StateId::new(42),
            }
        );
        assert_eq!(machine.state(), A);
        assert!(machine.previous_state().is_undefined());
        assert!(machine.history().is_empty());
    }

    #[test]
    fn flush_on_unstarted_machine_returns_immediately() {
        let machine = two_state_machine();
        assert!(machine.flush().is_ok());
    }
}
