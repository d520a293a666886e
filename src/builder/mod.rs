//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder that collects states, listeners
//! and configuration before creating a [`Machine`](crate::Machine), and the
//! [`fsm_ids!`](crate::fsm_ids) macro for declaring id enums.

pub mod machine;
pub mod macros;

pub use machine::MachineBuilder;
