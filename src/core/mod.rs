//! Core value types of the machine.
//!
//! This module contains the plain data the engine moves around:
//! - State and trigger identifiers
//! - Triggers and their opaque attachments
//! - State records and the read-only snapshot given to resolvers
//! - The bounded transition log
//!
//! Nothing here spawns threads or takes locks.

mod history;
mod id;
mod state;
mod trigger;

pub use history::{TransitionLog, TransitionRecord};
pub use id::{StateId, TriggerId};
pub use state::{MachineSnapshot, StateRecord};
pub use trigger::{Attachment, Trigger};
