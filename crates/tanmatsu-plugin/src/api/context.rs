//! Plugin context — the host services available to one plugin.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tanmatsu_core::HostResult;

use super::led::Rgb;
use crate::hooks::definitions::HookId;
use crate::hooks::registry::InputHook;
use crate::host::Host;
use crate::widgets::table::{StatusWidget, WidgetId};

/// Context passed to plugin callbacks.
///
/// Every call made through a context is attributed to the plugin's slug,
/// so a plugin can only unregister or release what it registered or
/// claimed itself. Clones share the same stop signal.
#[derive(Clone)]
pub struct PluginContext {
    /// Owning plugin.
    slug: Arc<str>,
    /// Shared host tables and hardware.
    host: Arc<Host>,
    /// Cancelled when the plugin is asked to stop.
    stop: CancellationToken,
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("slug", &self.slug)
            .field("stopping", &self.stop.is_cancelled())
            .finish()
    }
}

impl PluginContext {
    /// Creates a context for `slug` with a fresh stop signal.
    pub fn new(slug: impl Into<Arc<str>>, host: Arc<Host>) -> Self {
        Self {
            slug: slug.into(),
            host,
            stop: CancellationToken::new(),
        }
    }

    /// Slug of the owning plugin.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The shared host.
    pub fn host(&self) -> &Arc<Host> {
        &self.host
    }

    // ── Stop signal ──

    /// Signals the plugin's service loop to exit.
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    /// Returns whether a stop has been requested.
    pub fn should_stop(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Completes once a stop has been requested.
    pub async fn stopped(&self) {
        self.stop.cancelled().await;
    }

    /// Sleeps for `ms` milliseconds.
    ///
    /// Returns `false` early if a stop is requested while sleeping.
    pub async fn delay_ms(&self, ms: u32) -> bool {
        tokio::select! {
            _ = self.stopped() => false,
            _ = tokio::time::sleep(Duration::from_millis(u64::from(ms))) => true,
        }
    }

    /// Current tick in milliseconds. Wraps around at `u32::MAX`.
    pub fn get_tick_ms(&self) -> u32 {
        self.host.now_ms()
    }

    // ── Status widgets ──

    /// Registers a status bar widget.
    pub fn status_widget_register(&self, widget: Arc<dyn StatusWidget>) -> HostResult<WidgetId> {
        self.host.register_widget(&self.slug, widget)
    }

    /// Unregisters a status bar widget. Unknown ids are ignored.
    pub fn status_widget_unregister(&self, id: WidgetId) -> HostResult<()> {
        self.host.unregister_widget(&self.slug, id)
    }

    // ── Input hooks ──

    /// Registers an input hook.
    pub fn input_hook_register(&self, hook: Arc<dyn InputHook>) -> HostResult<HookId> {
        self.host.register_hook(&self.slug, hook)
    }

    /// Unregisters an input hook. Unknown ids are ignored.
    pub fn input_hook_unregister(&self, id: HookId) -> HostResult<()> {
        self.host.unregister_hook(&self.slug, id)
    }

    // ── LEDs ──

    /// Claims exclusive use of one LED.
    pub fn led_claim(&self, index: u32) -> HostResult<()> {
        self.host.led_claim(&self.slug, index)
    }

    /// Releases a claimed LED.
    pub fn led_release(&self, index: u32) -> HostResult<()> {
        self.host.led_release(&self.slug, index)
    }

    /// Stages a color on a claimed LED.
    pub fn led_set_pixel_rgb(&self, index: u32, color: Rgb) -> HostResult<()> {
        self.host.led_set_pixel(&self.slug, index, color)
    }

    /// Pushes staged LED colors to the strip.
    pub fn led_send(&self) -> HostResult<()> {
        self.host.led_send(&self.slug)
    }

    // ── Display ──

    /// Asks the launcher to redraw the header.
    pub fn display_flush(&self) {
        self.host.request_redraw();
    }

    // ── Logging ──

    pub fn log_info(&self, message: &str) {
        info!(plugin = %self.slug, "{message}");
    }

    pub fn log_warn(&self, message: &str) {
        warn!(plugin = %self.slug, "{message}");
    }

    pub fn log_error(&self, message: &str) {
        error!(plugin = %self.slug, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::led::MemoryLedStrip;
    use tanmatsu_core::ManualClock;
    use tanmatsu_core::config::HostConfig;

    fn context(slug: &str) -> PluginContext {
        let host = Arc::new(Host::new(
            &HostConfig::default(),
            Box::new(MemoryLedStrip::new(6)),
            Arc::new(ManualClock::new(42)),
        ));
        PluginContext::new(slug, host)
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_interrupted_by_stop() {
        let ctx = context("sleepy");
        assert!(ctx.delay_ms(100).await);

        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.delay_ms(60_000).await });
        ctx.request_stop();
        assert!(!handle.await.unwrap());
        assert!(ctx.should_stop());
    }

    #[test]
    fn test_tick_comes_from_host_clock() {
        assert_eq!(context("a").get_tick_ms(), 42);
    }

    #[test]
    fn test_flush_requests_redraw() {
        let ctx = context("a");
        ctx.display_flush();
        assert!(ctx.host().take_redraw_request());
    }
}
