//! Hook dispatcher — delivers input events to the registered hooks.
//!
//! - Hooks are called in registration order.
//! - A hook returning `Consume` stops propagation; later hooks and the
//!   launcher's default handling never see the event.
//! - The table is snapshotted before iterating and each hook's id is
//!   re-checked before it runs, so a hook may unregister itself or any
//!   other hook mid-dispatch. The host lock is never held across a call.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::definitions::{DispatchResult, HookAction, InputEvent};
use crate::host::HostTables;

/// Dispatches input events to all registered hooks.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Shared host tables.
    tables: Arc<Mutex<HostTables>>,
}

impl HookDispatcher {
    /// Creates a dispatcher over the host tables.
    pub fn new(tables: Arc<Mutex<HostTables>>) -> Self {
        Self { tables }
    }

    /// Dispatches one event.
    pub fn dispatch(&self, event: &InputEvent) -> DispatchResult {
        let hooks = self.tables.lock().hooks.snapshot();
        let mut result = DispatchResult::default();

        if hooks.is_empty() {
            return result;
        }

        trace!(
            event = event.kind_str(),
            hook_count = hooks.len(),
            "Dispatching input event"
        );

        for (id, owner, hook) in hooks {
            if !self.tables.lock().hooks.is_live(id) {
                trace!(hook_id = id.0, "Skipping hook unregistered during dispatch");
                continue;
            }

            result.invoked.push(id);

            if hook.on_event(event) == HookAction::Consume {
                debug!(
                    plugin = %owner,
                    hook_id = id.0,
                    event = event.kind_str(),
                    "Input event consumed"
                );
                result.consumed = true;
                result.consumed_by = Some(id);
                result.consumed_owner = Some(owner);
                break;
            }
        }

        result
    }
}
