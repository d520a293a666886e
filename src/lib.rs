//! Trigger FSM: a trigger driven finite state machine runtime
//!
//! Callers register numbered states, each bound to a *resolver* that decides
//! which state an incoming trigger leads to. Triggers are emitted from any
//! thread and processed strictly one at a time, in arrival order, on a
//! worker thread owned by the machine. Every committed transition notifies
//! the registered listeners.
//!
//! # Core Concepts
//!
//! - **Trigger**: an id plus an optional opaque attachment
//! - **Resolver**: maps `(trigger, machine snapshot)` to a target state, with
//!   optional parent fallback (`MapResolver`, `BlockResolver`)
//! - **Listeners**: callbacks scoped to any transition, leaving a state,
//!   entering a state, or a specific pair, removable in bulk by owner key
//! - **Machine**: owns the states, the queue, the worker and the listeners
//!
//! # Example
//!
//! ```rust
//! use trigger_fsm::core::{StateId, TriggerId};
//! use trigger_fsm::listener::OwnerKey;
//! use trigger_fsm::resolver::{block_resolver, map_resolver};
//! use trigger_fsm::{fsm_ids, MachineBuilder};
//! use std::sync::{Arc, Mutex};
//!
//! fsm_ids! {
//!     enum Door: StateId { Closed, Open, Locked }
//! }
//! fsm_ids! {
//!     enum Action: TriggerId { Push, Pull, Turn }
//! }
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let sink = log.clone();
//!
//! let machine = MachineBuilder::new()
//!     .name("door")
//!     .state(Door::Closed, "Closed", map_resolver([
//!         (TriggerId::from(Action::Pull), StateId::from(Door::Open)),
//!         (TriggerId::from(Action::Turn), StateId::from(Door::Locked)),
//!     ]))
//!     .state(Door::Open, "Open", map_resolver([(TriggerId::from(Action::Push), StateId::from(Door::Closed))]))
//!     // A locked door only unlocks with the right key attached to the trigger.
//!     .state(Door::Locked, "Locked", block_resolver(|trigger, _| {
//!         match trigger.attachment::<&str>() {
//!             Some(&"key") => StateId::from(Door::Closed),
//!             _ => StateId::UNDEFINED,
//!         }
//!     }))
//!     .on_transition_call(move |m| {
//!         sink.lock().unwrap().push(m.name_for_state(m.state()).unwrap());
//!     }, OwnerKey::new())
//!     .start(Door::Closed)
//!     .unwrap();
//!
//! machine.emit_trigger(Action::Turn).unwrap();
//! machine.emit_trigger_with(Action::Turn, "wrong").unwrap();
//! machine.emit_trigger_with(Action::Turn, "key").unwrap();
//! machine.emit_trigger(Action::Pull).unwrap();
//! machine.flush().unwrap();
//!
//! assert_eq!(*log.lock().unwrap(), vec!["Locked", "Closed", "Open"]);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod listener;
pub mod resolver;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use config::MachineConfig;
pub use crate::core::{MachineSnapshot, StateId, Trigger, TriggerId};
pub use engine::{ErrorKind, Machine, MachineError, Result};
pub use listener::OwnerKey;
pub use resolver::{BlockResolver, MapResolver, Resolver, SharedResolver};
