//! Input hooks — table, dispatcher, and event definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{
    ActionKind, DispatchResult, HookAction, HookId, InputEvent, Modifiers, NavigationKey,
};
pub use dispatcher::HookDispatcher;
pub use registry::{HookTable, InputHook};
