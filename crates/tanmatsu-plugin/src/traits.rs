//! Closure adapters for the callback traits.

use std::sync::Arc;

use crate::api::context::PluginContext;
use crate::hooks::definitions::{HookAction, InputEvent};
use crate::hooks::registry::InputHook;
use crate::registry::Plugin;
use crate::widgets::canvas::Canvas;
use crate::widgets::table::{StatusWidget, WidgetSlot};

/// A closure-based input hook.
pub struct HookFn<F> {
    handler: F,
}

impl<F> std::fmt::Debug for HookFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookFn")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl<F> InputHook for HookFn<F>
where
    F: Fn(&InputEvent) -> HookAction + Send + Sync,
{
    fn on_event(&self, event: &InputEvent) -> HookAction {
        (self.handler)(event)
    }
}

/// Wraps a closure into an `Arc<dyn InputHook>`.
///
/// ```rust,ignore
/// let id = ctx.input_hook_register(hook_fn(|event| {
///     HookAction::consumed(event.is_press())
/// }))?;
/// ```
pub fn hook_fn<F>(handler: F) -> Arc<dyn InputHook>
where
    F: Fn(&InputEvent) -> HookAction + Send + Sync + 'static,
{
    Arc::new(HookFn { handler })
}

/// A closure-based status widget.
pub struct WidgetFn<F> {
    render: F,
}

impl<F> std::fmt::Debug for WidgetFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetFn")
            .field("render", &"<closure>")
            .finish()
    }
}

impl<F> StatusWidget for WidgetFn<F>
where
    F: Fn(&mut dyn Canvas, WidgetSlot) -> u32 + Send + Sync,
{
    fn render(&self, canvas: &mut dyn Canvas, slot: WidgetSlot) -> u32 {
        (self.render)(canvas, slot)
    }
}

/// Wraps a closure into an `Arc<dyn StatusWidget>`.
pub fn widget_fn<F>(render: F) -> Arc<dyn StatusWidget>
where
    F: Fn(&mut dyn Canvas, WidgetSlot) -> u32 + Send + Sync + 'static,
{
    Arc::new(WidgetFn { render })
}

/// Routes input events to a `Hook` plugin's `hook_event`.
#[derive(Debug)]
pub struct PluginHookAdapter {
    plugin: Arc<dyn Plugin>,
    ctx: PluginContext,
}

impl PluginHookAdapter {
    /// Wraps a plugin into an `Arc<dyn InputHook>`.
    pub fn wrap(plugin: Arc<dyn Plugin>, ctx: PluginContext) -> Arc<dyn InputHook> {
        Arc::new(Self { plugin, ctx })
    }
}

impl InputHook for PluginHookAdapter {
    fn on_event(&self, event: &InputEvent) -> HookAction {
        self.plugin.hook_event(&self.ctx, event)
    }
}
