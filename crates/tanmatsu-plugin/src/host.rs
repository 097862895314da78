//! The host — owner of every table plugins register into.
//!
//! All mutations of the hook, widget and resource tables go through one
//! `parking_lot` mutex around [`HostTables`]. LED writes take a second,
//! hardware lock, always after the table lock, and are only accepted from
//! the plugin currently holding the LED's claim.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use tanmatsu_core::config::HostConfig;
use tanmatsu_core::{ErrorKind, HostError, HostResult, TickSource};

use crate::api::led::{LedDriver, Rgb};
use crate::hooks::definitions::{DispatchResult, HookId, InputEvent};
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::{HookTable, InputHook};
use crate::resources::{ResourceKind, ResourceRegistry};
use crate::widgets::canvas::Canvas;
use crate::widgets::renderer::{HeaderBounds, RenderReport, WidgetRenderer};
use crate::widgets::table::{StatusWidget, WidgetId, WidgetTable};

/// The tables guarded by the host lock.
#[derive(Debug)]
pub struct HostTables {
    /// Exclusive resource claims.
    pub resources: ResourceRegistry,
    /// Input hooks.
    pub hooks: HookTable,
    /// Status widgets.
    pub widgets: WidgetTable,
    /// Plugins currently allowed to register and claim.
    admitted: HashSet<String>,
}

impl HostTables {
    /// Creates empty tables with the given capacities.
    pub fn new(max_hooks: usize, max_widgets: usize) -> Self {
        Self {
            resources: ResourceRegistry::new(),
            hooks: HookTable::new(max_hooks),
            widgets: WidgetTable::new(max_widgets),
            admitted: HashSet::new(),
        }
    }

    fn ensure_admitted(&self, owner: &str) -> HostResult<()> {
        if self.admitted.contains(owner) {
            Ok(())
        } else {
            Err(HostError::new(
                ErrorKind::RegistrationFailed,
                format!("Plugin '{owner}' is not active"),
            ))
        }
    }
}

/// What a plugin holds in the host tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Holdings {
    /// Registered input hooks.
    pub hooks: usize,
    /// Registered status widgets.
    pub widgets: usize,
    /// Claimed resources.
    pub claims: Vec<(ResourceKind, u32)>,
}

impl Holdings {
    /// Returns whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.hooks == 0 && self.widgets == 0 && self.claims.is_empty()
    }
}

/// Shared host state handed to plugin contexts and the launcher loops.
pub struct Host {
    /// Hook, widget and resource tables.
    tables: Arc<Mutex<HostTables>>,
    /// Input event dispatcher.
    dispatcher: HookDispatcher,
    /// Header renderer.
    renderer: WidgetRenderer,
    /// LED driver; its mutex is the hardware lock.
    leds: Mutex<Box<dyn LedDriver>>,
    /// Number of claimable LEDs.
    led_count: u32,
    /// Whether force-released LEDs are switched off.
    blank_on_release: bool,
    /// Header geometry for status widgets.
    header: HeaderBounds,
    /// Tick source exposed to plugins.
    clock: Arc<dyn TickSource>,
    /// Set by `display_flush`, cleared by the render loop.
    redraw_pending: AtomicBool,
    /// Wakes the render loop.
    redraw: Notify,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("tables", &self.tables)
            .field("led_count", &self.led_count)
            .field("header", &self.header)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Host {
    /// Creates a host from configuration, an LED driver and a clock.
    pub fn new(config: &HostConfig, leds: Box<dyn LedDriver>, clock: Arc<dyn TickSource>) -> Self {
        let tables = Arc::new(Mutex::new(HostTables::new(
            config.plugins.max_hooks,
            config.plugins.max_widgets,
        )));

        let driver_count = leds.led_count();
        if driver_count != config.leds.count {
            warn!(
                configured = config.leds.count,
                driver = driver_count,
                "LED count differs from driver; using the smaller"
            );
        }

        Self {
            dispatcher: HookDispatcher::new(tables.clone()),
            renderer: WidgetRenderer::new(tables.clone()),
            tables,
            leds: Mutex::new(leds),
            led_count: driver_count.min(config.leds.count),
            blank_on_release: config.leds.blank_on_release,
            header: HeaderBounds::from(&config.display),
            clock,
            redraw_pending: AtomicBool::new(false),
            redraw: Notify::new(),
        }
    }

    // ── Plugin admission ──

    /// Allows `owner` to register callbacks and claim resources.
    pub fn admit(&self, owner: &str) -> HostResult<()> {
        let mut tables = self.tables.lock();
        if !tables.admitted.insert(owner.to_string()) {
            return Err(HostError::conflict(format!(
                "Plugin '{owner}' is already active"
            )));
        }
        debug!(plugin = %owner, "Plugin admitted");
        Ok(())
    }

    /// Returns whether `owner` is currently admitted.
    pub fn is_admitted(&self, owner: &str) -> bool {
        self.tables.lock().admitted.contains(owner)
    }

    /// Revokes `owner` and removes everything it holds.
    ///
    /// Force-released LEDs are switched off when `leds.blank_on_release`
    /// is set.
    pub fn purge_owner(&self, owner: &str) -> Holdings {
        let mut tables = self.tables.lock();
        tables.admitted.remove(owner);

        let report = Holdings {
            hooks: tables.hooks.unregister_owner(owner),
            widgets: tables.widgets.unregister_owner(owner),
            claims: tables.resources.force_release_all(owner),
        };

        let leds: Vec<u32> = report
            .claims
            .iter()
            .filter(|(kind, _)| *kind == ResourceKind::Led)
            .map(|(_, index)| *index)
            .collect();

        if self.blank_on_release && !leds.is_empty() {
            let mut driver = self.leds.lock();
            let blanked = leds
                .iter()
                .try_for_each(|index| driver.set_pixel_rgb(*index, Rgb::OFF))
                .and_then(|_| driver.send());
            if let Err(e) = blanked {
                error!(plugin = %owner, error = %e, "Failed to blank released LEDs");
            }
        }

        if !report.is_empty() {
            info!(
                plugin = %owner,
                hooks = report.hooks,
                widgets = report.widgets,
                claims = report.claims.len(),
                "Plugin holdings purged"
            );
        }

        report
    }

    /// Returns what `owner` currently holds.
    pub fn holdings(&self, owner: &str) -> Holdings {
        let tables = self.tables.lock();
        Holdings {
            hooks: tables.hooks.count_owned(owner),
            widgets: tables.widgets.count_owned(owner),
            claims: tables.resources.claims_of(owner),
        }
    }

    // ── Registration ──

    /// Registers an input hook for `owner`.
    pub fn register_hook(&self, owner: &str, hook: Arc<dyn InputHook>) -> HostResult<HookId> {
        let mut tables = self.tables.lock();
        tables.ensure_admitted(owner)?;
        tables.hooks.register(hook, owner)
    }

    /// Unregisters an input hook owned by `owner`.
    pub fn unregister_hook(&self, owner: &str, id: HookId) -> HostResult<()> {
        self.tables
            .lock()
            .hooks
            .unregister(id, owner)
            .inspect_err(|e| {
                warn!(plugin = %owner, hook_id = id.0, error = %e, "Unregister rejected");
            })
    }

    /// Registers a status widget for `owner`.
    pub fn register_widget(
        &self,
        owner: &str,
        widget: Arc<dyn StatusWidget>,
    ) -> HostResult<WidgetId> {
        let mut tables = self.tables.lock();
        tables.ensure_admitted(owner)?;
        tables.widgets.register(widget, owner)
    }

    /// Unregisters a status widget owned by `owner`.
    pub fn unregister_widget(&self, owner: &str, id: WidgetId) -> HostResult<()> {
        self.tables
            .lock()
            .widgets
            .unregister(id, owner)
            .inspect_err(|e| {
                warn!(plugin = %owner, widget_id = id.0, error = %e, "Unregister rejected");
            })
    }

    // ── Resources ──

    /// Claims a resource. Denied for plugins that are not admitted.
    pub fn claim(&self, owner: &str, kind: ResourceKind, index: u32) -> bool {
        let mut tables = self.tables.lock();
        if !tables.admitted.contains(owner) {
            warn!(plugin = %owner, resource = %kind, index, "Claim from inactive plugin denied");
            return false;
        }
        tables.resources.claim(kind, index, owner)
    }

    /// Releases a resource held by `owner`.
    pub fn release(&self, owner: &str, kind: ResourceKind, index: u32) -> bool {
        self.tables.lock().resources.release(kind, index, owner)
    }

    /// Number of claimable LEDs.
    pub fn led_count(&self) -> u32 {
        self.led_count
    }

    /// Claims one LED for `owner`.
    pub fn led_claim(&self, owner: &str, index: u32) -> HostResult<()> {
        self.check_led_index(index)?;

        let mut tables = self.tables.lock();
        if !tables.admitted.contains(owner) {
            return Err(HostError::claim_denied(format!(
                "Plugin '{owner}' is not active"
            )));
        }
        if tables.resources.claim(ResourceKind::Led, index, owner) {
            Ok(())
        } else {
            let holder = tables
                .resources
                .owner_of(ResourceKind::Led, index)
                .unwrap_or("unknown")
                .to_string();
            Err(HostError::claim_denied(format!(
                "LED {index} is owned by '{holder}'"
            )))
        }
    }

    /// Releases one LED held by `owner`.
    pub fn led_release(&self, owner: &str, index: u32) -> HostResult<()> {
        self.check_led_index(index)?;

        if self.release(owner, ResourceKind::Led, index) {
            Ok(())
        } else {
            Err(HostError::not_owner(format!(
                "LED {index} is not claimed by '{owner}'"
            )))
        }
    }

    /// Stages a color on an LED claimed by `owner`.
    pub fn led_set_pixel(&self, owner: &str, index: u32, color: Rgb) -> HostResult<()> {
        self.check_led_index(index)?;

        let tables = self.tables.lock();
        if tables.resources.owner_of(ResourceKind::Led, index) != Some(owner) {
            return Err(HostError::not_owner(format!(
                "LED {index} is not claimed by '{owner}'"
            )));
        }
        self.leds.lock().set_pixel_rgb(index, color)
    }

    /// Pushes staged LED colors to the hardware.
    pub fn led_send(&self, owner: &str) -> HostResult<()> {
        let tables = self.tables.lock();
        if tables.resources.claims_of(owner).is_empty() {
            return Err(HostError::not_owner(format!(
                "Plugin '{owner}' holds no LED claims"
            )));
        }
        self.leds.lock().send()
    }

    fn check_led_index(&self, index: u32) -> HostResult<()> {
        if index < self.led_count {
            Ok(())
        } else {
            Err(HostError::validation(format!(
                "LED index {index} out of range (0..{})",
                self.led_count
            )))
        }
    }

    // ── Launcher loops ──

    /// Delivers an input event to the registered hooks.
    pub fn dispatch_input(&self, event: &InputEvent) -> DispatchResult {
        self.dispatcher.dispatch(event)
    }

    /// Renders all status widgets into the configured header.
    pub fn render_header(&self, canvas: &mut dyn Canvas) -> RenderReport {
        self.renderer.render_all(canvas, self.header)
    }

    /// Renders all status widgets into explicit bounds.
    pub fn render_header_in(&self, canvas: &mut dyn Canvas, bounds: HeaderBounds) -> RenderReport {
        self.renderer.render_all(canvas, bounds)
    }

    /// Header geometry.
    pub fn header(&self) -> HeaderBounds {
        self.header
    }

    /// Asks the render loop to redraw.
    pub fn request_redraw(&self) {
        self.redraw_pending.store(true, Ordering::Release);
        self.redraw.notify_one();
    }

    /// Consumes a pending redraw request.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw_pending.swap(false, Ordering::AcqRel)
    }

    /// Waits until a redraw has been requested, then consumes the request.
    pub async fn redraw_requested(&self) {
        loop {
            if self.take_redraw_request() {
                return;
            }
            self.redraw.notified().await;
        }
    }

    /// Current tick in milliseconds.
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    /// Total entries across the tables: (hooks, widgets, claims).
    pub fn table_sizes(&self) -> (usize, usize, usize) {
        let tables = self.tables.lock();
        (
            tables.hooks.len(),
            tables.widgets.len(),
            tables.resources.len(),
        )
    }
}
