//! The serialized worker that drains a machine's trigger queue.
//!
//! One OS thread per started machine. It is the only place that resolves
//! triggers, mutates the machine's position, and runs callbacks. Between
//! commands it holds only a weak reference to the machine, so dropping the
//! last [`Machine`] handle closes the queue and ends the thread.

use super::error::MachineError;
use super::machine::{Machine, Shared};
use crate::core::Trigger;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

pub(crate) enum Command {
    Trigger(Trigger),
    /// Completed once every command queued before it has been handled.
    Flush(oneshot::Sender<()>),
}

pub(super) fn spawn(
    thread_name: String,
    machine: Weak<Shared>,
    queue: mpsc::UnboundedReceiver<Command>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || run(machine, queue))
}

fn run(machine: Weak<Shared>, mut queue: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = queue.blocking_recv() {
        let Some(shared) = machine.upgrade() else {
            break;
        };

        match command {
            Command::Trigger(trigger) => {
                if let Err(fault) = handle(Machine::from_shared(shared.clone()), trigger) {
                    error!(machine = %shared.name(), %fault, "machine halted");
                    shared.record_fault(fault);
                    break;
                }
            }
            Command::Flush(done) => {
                // The flusher may have given up waiting; nothing to do then.
                let _ = done.send(());
            }
        }
    }
    debug!("machine worker stopped");
}

fn handle(machine: Machine, trigger: Trigger) -> Result<(), MachineError> {
    match panic::catch_unwind(AssertUnwindSafe(|| machine.process(trigger))) {
        Ok(result) => result.map(|_| ()),
        Err(payload) => Err(MachineError::Halted {
            reason: format!("transition callback panicked: {}", panic_message(&*payload)),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
