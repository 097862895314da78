//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use tanmatsu_core::{ErrorKind, HostError, HostResult, deadline_after, deadline_passed};

pub use crate::api::context::PluginContext;
pub use crate::api::led::Rgb;
pub use crate::hooks::definitions::{
    ActionKind, HookAction, HookId, InputEvent, Modifiers, NavigationKey,
};
pub use crate::hooks::registry::InputHook;
pub use crate::registry::{
    PLUGIN_API_VERSION, Plugin, PluginDescriptor, PluginFlags, PluginType,
};
pub use crate::traits::{hook_fn, widget_fn};
pub use crate::widgets::canvas::{Canvas, Color, Rect};
pub use crate::widgets::table::{StatusWidget, WidgetId, WidgetSlot};

pub use crate::plugin_descriptor;
