//! Hook table — plugins register input hooks, invoked in registration order.

use std::sync::Arc;

use tracing::{debug, info};

use tanmatsu_core::{HostError, HostResult};

use super::definitions::{HookAction, HookId, InputEvent};
use crate::arena::{CallbackArena, Removal};

/// Trait for input hook implementations.
pub trait InputHook: Send + Sync {
    /// Handles one input event.
    fn on_event(&self, event: &InputEvent) -> HookAction;
}

/// Bounded table of input hooks keyed by [`HookId`].
#[derive(Debug)]
pub struct HookTable {
    arena: CallbackArena<Arc<dyn InputHook>>,
}

impl std::fmt::Debug for dyn InputHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<input hook>")
    }
}

impl HookTable {
    /// Creates an empty table holding at most `capacity` hooks.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: CallbackArena::new(capacity),
        }
    }

    /// Registers a hook on behalf of `owner`.
    pub fn register(&mut self, hook: Arc<dyn InputHook>, owner: &str) -> HostResult<HookId> {
        let id = self
            .arena
            .insert(owner, hook)
            .ok_or_else(|| HostError::hook_limit_exceeded(self.arena.capacity()))?;

        info!(plugin = %owner, hook_id = id, "Input hook registered");
        Ok(HookId(id))
    }

    /// Unregisters a hook. Unknown ids are accepted silently; ids owned by
    /// another plugin are rejected.
    pub fn unregister(&mut self, id: HookId, caller: &str) -> HostResult<()> {
        match self.arena.remove(id.0, caller) {
            Removal::Removed => {
                info!(plugin = %caller, hook_id = id.0, "Input hook unregistered");
                Ok(())
            }
            Removal::Missing => {
                debug!(plugin = %caller, hook_id = id.0, "Input hook already unregistered");
                Ok(())
            }
            Removal::Foreign { owner } => Err(HostError::not_owner(format!(
                "Hook {id} belongs to '{owner}', not '{caller}'"
            ))),
        }
    }

    /// Removes every hook owned by `owner`.
    pub fn unregister_owner(&mut self, owner: &str) -> usize {
        self.arena.remove_owner(owner)
    }

    /// Returns whether the hook is still registered.
    pub fn is_live(&self, id: HookId) -> bool {
        self.arena.contains(id.0)
    }

    /// Returns the owner of a live hook.
    pub fn owner_of(&self, id: HookId) -> Option<&str> {
        self.arena.owner_of(id.0)
    }

    /// Clones the live hooks in registration order.
    pub fn snapshot(&self) -> Vec<(HookId, String, Arc<dyn InputHook>)> {
        self.arena
            .snapshot()
            .into_iter()
            .map(|(id, entry)| (HookId(id), entry.owner, entry.callback))
            .collect()
    }

    /// Number of hooks owned by `owner`.
    pub fn count_owned(&self, owner: &str) -> usize {
        self.arena.count_owned(owner)
    }

    /// Number of live hooks.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
