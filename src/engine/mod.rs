//! The machine engine.
//!
//! # Processing model
//!
//! - Producers call `emit*` from any thread; the trigger is queued and the
//!   call returns at once
//! - A single worker thread per machine dequeues triggers in FIFO order
//! - For each trigger the current state's resolver chain picks a target;
//!   an undefined target means the trigger is dropped silently
//! - A defined target must be registered, otherwise the machine halts with
//!   a configuration error and nothing is mutated
//! - On a committed transition the callbacks run in this order: leaving,
//!   leaving-entering, entering, any, debug hook
//!
//! Callbacks run on the worker thread. A callback that blocks stalls every
//! later trigger of that machine.

mod error;
mod machine;
mod worker;

pub use error::{ErrorKind, MachineError, Result};
pub use machine::{Callback, Machine};
