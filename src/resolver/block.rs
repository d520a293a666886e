//! Closure driven resolver.

use super::{fall_back, Resolver, SharedResolver};
use crate::core::{MachineSnapshot, StateId, Trigger};
use std::fmt;
use std::sync::Arc;

/// Signature of the closure run by a [`BlockResolver`].
pub type ResolveFn = dyn Fn(&Trigger, &MachineSnapshot) -> StateId + Send + Sync;

/// Resolver that runs a caller supplied function for every trigger.
///
/// When the function answers [`StateId::UNDEFINED`] and a parent is set, the
/// parent decides instead.
pub struct BlockResolver {
    parent: Option<SharedResolver>,
    block: Box<ResolveFn>,
}

impl BlockResolver {
    pub fn new<F>(block: F) -> Self
    where
        F: Fn(&Trigger, &MachineSnapshot) -> StateId + Send + Sync + 'static,
    {
        Self {
            parent: None,
            block: Box::new(block),
        }
    }

    pub fn with_parent<F>(parent: SharedResolver, block: F) -> Self
    where
        F: Fn(&Trigger, &MachineSnapshot) -> StateId + Send + Sync + 'static,
    {
        Self {
            parent: Some(parent),
            block: Box::new(block),
        }
    }

    pub fn parent(&self) -> Option<&SharedResolver> {
        self.parent.as_ref()
    }
}

impl Resolver for BlockResolver {
    fn resolve(&self, trigger: &Trigger, machine: &MachineSnapshot) -> StateId {
        let target = (self.block)(trigger, machine);
        if target.is_undefined() {
            fall_back(self.parent.as_ref(), trigger, machine)
        } else {
            target
        }
    }
}

impl fmt::Debug for BlockResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockResolver")
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}

/// Shortcut for a parentless [`BlockResolver`].
pub fn block_resolver<F>(block: F) -> Arc<BlockResolver>
where
    F: Fn(&Trigger, &MachineSnapshot) -> StateId + Send + Sync + 'static,
{
    Arc::new(BlockResolver::new(block))
}

/// Shortcut for a [`BlockResolver`] that falls back to `parent`.
pub fn child_block_resolver<F>(parent: SharedResolver, block: F) -> Arc<BlockResolver>
where
    F: Fn(&Trigger, &MachineSnapshot) -> StateId + Send + Sync + 'static,
{
    Arc::new(BlockResolver::with_parent(parent, block))
}
