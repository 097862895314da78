//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use tanmatsu_core::ManualClock;
use tanmatsu_core::config::HostConfig;
use tanmatsu_plugin::prelude::*;
use tanmatsu_plugin::{Host, MemoryLedStrip, PluginManager};

/// Test host context
pub struct TestHost {
    /// Shared host
    pub host: Arc<Host>,
    /// Lifecycle manager over `host`
    pub manager: PluginManager,
    /// Handle onto the host's LED strip
    pub strip: MemoryLedStrip,
    /// Clock exposed to plugins
    pub clock: Arc<ManualClock>,
}

impl TestHost {
    /// Create a host with default configuration
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// Create a host with a short stop timeout
    pub fn with_stop_timeout(ms: u64) -> Self {
        let mut config = HostConfig::default();
        config.plugins.stop_timeout_ms = ms;
        Self::with_config(config)
    }

    /// Create a host from explicit configuration
    pub fn with_config(config: HostConfig) -> Self {
        let strip = MemoryLedStrip::new(config.leds.count);
        let clock = Arc::new(ManualClock::new(0));
        let host = Arc::new(Host::new(&config, Box::new(strip.clone()), clock.clone()));
        let manager = PluginManager::new(host.clone(), config.plugins.clone());
        Self {
            host,
            manager,
            strip,
            clock,
        }
    }
}

/// How a `ScriptedPlugin` service loop behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    /// Exits as soon as stop is requested.
    Cooperative,
    /// Ignores the stop signal until `release_service` is set.
    Stubborn,
    /// Returns an error right away.
    Failing,
    /// Panics right away.
    Panicking,
}

/// Counters shared between a `ScriptedPlugin` and the test body.
#[derive(Debug, Default)]
pub struct Probe {
    pub inits: AtomicUsize,
    pub cleanups: AtomicUsize,
    pub cleanup_saw_service_running: AtomicBool,
    pub service_running: AtomicBool,
    pub release_service: AtomicBool,
    pub events: AtomicUsize,
    pub menu_selects: AtomicUsize,
    pub widget_ids: Mutex<Vec<WidgetId>>,
    pub hook_ids: Mutex<Vec<HookId>>,
}

impl Probe {
    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

/// A configurable plugin for lifecycle tests.
#[derive(Debug)]
pub struct ScriptedPlugin {
    pub slug: String,
    pub kind: PluginType,
    pub flags: PluginFlags,
    pub api_version: u32,
    /// LEDs claimed during init.
    pub leds: Vec<u32>,
    /// Hooks registered during init.
    pub hooks: usize,
    /// Widgets registered during init, each 16px wide.
    pub widgets: usize,
    /// Fail init after claiming LEDs, before registering anything.
    pub fail_after_claims: bool,
    /// Release and unregister everything in cleanup.
    pub tidy: bool,
    pub service: ServiceMode,
    pub probe: Arc<Probe>,
}

impl ScriptedPlugin {
    pub fn new(slug: &str, kind: PluginType) -> Self {
        Self {
            slug: slug.to_string(),
            kind,
            flags: PluginFlags::AUTOSTART,
            api_version: PLUGIN_API_VERSION,
            leds: Vec::new(),
            hooks: 0,
            widgets: 0,
            fail_after_claims: false,
            tidy: true,
            service: ServiceMode::Cooperative,
            probe: Arc::new(Probe::default()),
        }
    }

    pub fn service(slug: &str) -> Self {
        Self::new(slug, PluginType::Service)
    }

    pub fn shared(self) -> (Arc<dyn Plugin>, Arc<Probe>) {
        let probe = self.probe.clone();
        (Arc::new(self), probe)
    }
}

#[async_trait]
impl Plugin for ScriptedPlugin {
    fn info(&self) -> PluginDescriptor {
        PluginDescriptor {
            name: format!("Scripted {}", self.slug),
            slug: self.slug.clone(),
            version: "0.1.0".to_string(),
            author: "tests".to_string(),
            description: String::new(),
            api_version: self.api_version,
            plugin_type: self.kind,
            flags: self.flags,
        }
    }

    async fn init(&self, ctx: &PluginContext) -> HostResult<()> {
        self.probe.inits.fetch_add(1, Ordering::SeqCst);

        for index in &self.leds {
            ctx.led_claim(*index)?;
        }
        if self.fail_after_claims {
            return Err(HostError::hardware("scripted init failure"));
        }

        for _ in 0..self.hooks {
            let probe = self.probe.clone();
            let id = ctx.input_hook_register(hook_fn(move |_| {
                probe.events.fetch_add(1, Ordering::SeqCst);
                HookAction::Continue
            }))?;
            self.probe.hook_ids.lock().push(id);
        }

        for _ in 0..self.widgets {
            let id = ctx.status_widget_register(widget_fn(|canvas, slot| {
                canvas.fill_rect(slot.region(16), Color::WHITE);
                16
            }))?;
            self.probe.widget_ids.lock().push(id);
        }

        Ok(())
    }

    async fn cleanup(&self, ctx: &PluginContext) {
        self.probe.cleanups.fetch_add(1, Ordering::SeqCst);
        if self.probe.service_running.load(Ordering::SeqCst) {
            self.probe
                .cleanup_saw_service_running
                .store(true, Ordering::SeqCst);
        }
        if !self.tidy {
            return;
        }

        for id in self.probe.hook_ids.lock().drain(..) {
            let _ = ctx.input_hook_unregister(id);
        }
        for id in self.probe.widget_ids.lock().drain(..) {
            let _ = ctx.status_widget_unregister(id);
        }
        for index in &self.leds {
            let _ = ctx.led_release(*index);
        }
    }

    async fn service_run(&self, ctx: PluginContext) -> HostResult<()> {
        self.probe.service_running.store(true, Ordering::SeqCst);
        let result = match self.service {
            ServiceMode::Cooperative => {
                while ctx.delay_ms(20).await {}
                Ok(())
            }
            ServiceMode::Stubborn => {
                while !self.probe.release_service.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                Ok(())
            }
            ServiceMode::Failing => Err(HostError::hardware("scripted service failure")),
            ServiceMode::Panicking => panic!("scripted service panic"),
        };
        self.probe.service_running.store(false, Ordering::SeqCst);
        result
    }

    fn menu_render(&self, _ctx: &PluginContext, canvas: &mut dyn Canvas) {
        canvas.draw_text(0, 0, &self.slug, Color::WHITE);
    }

    fn menu_select(&self, _ctx: &PluginContext) {
        self.probe.menu_selects.fetch_add(1, Ordering::SeqCst);
    }

    fn hook_event(&self, _ctx: &PluginContext, event: &InputEvent) -> HookAction {
        self.probe.events.fetch_add(1, Ordering::SeqCst);
        HookAction::consumed(*event == InputEvent::key('q'))
    }
}
