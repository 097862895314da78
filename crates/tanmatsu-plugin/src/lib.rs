//! # tanmatsu-plugin
//!
//! Plugin host for the Tanmatsu launcher. Provides:
//!
//! - Resource registry for exclusive claims on indexed LEDs
//! - Input hook table with registration-order dispatch and consume semantics
//! - Status widget table with right-to-left header packing
//! - Plugin lifecycle management (init, service task, stop, cleanup)
//! - The [`PluginContext`] handle through which plugins reach the host

pub mod api;
pub mod arena;
pub mod hooks;
pub mod host;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod resources;
pub mod traits;
pub mod widgets;

pub use api::context::PluginContext;
pub use api::led::{LedDriver, MemoryLedStrip, Rgb};
pub use hooks::definitions::{DispatchResult, HookAction, HookId, InputEvent};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::{HookTable, InputHook};
pub use host::{Holdings, Host, HostTables};
pub use manager::PluginManager;
pub use registry::{
    PLUGIN_API_VERSION, Plugin, PluginDescriptor, PluginFlags, PluginRegistry, PluginState,
    PluginStatus, PluginType,
};
pub use resources::{ResourceKind, ResourceRegistry};
pub use widgets::canvas::{Canvas, Color, DrawOp, Rect, RecordingCanvas};
pub use widgets::renderer::{HeaderBounds, RenderReport, WidgetPlacement, WidgetRenderer};
pub use widgets::table::{StatusWidget, WidgetId, WidgetSlot, WidgetTable};
