//! Plugin manager — lifecycle management for all plugins.
//!
//! `Unloaded → Initializing → Running → Stopping → Unloaded`.
//!
//! Unload signals stop, joins the service task within
//! `plugins.stop_timeout_ms`, runs cleanup once, then force-removes
//! anything the plugin left in the host tables. A service loop that does
//! not stop in time has its registrations revoked on the spot; a reaper
//! task runs cleanup once the loop finally returns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use tanmatsu_core::config::PluginConfig;
use tanmatsu_core::{ErrorKind, HostError, HostResult};

use crate::api::context::PluginContext;
use crate::hooks::definitions::HookId;
use crate::host::Host;
use crate::registry::{Plugin, PluginFlags, PluginRegistry, PluginState, PluginStatus, PluginType};
use crate::traits::PluginHookAdapter;
use crate::widgets::canvas::Canvas;

type ServiceHandle = JoinHandle<HostResult<()>>;

/// Manages the full lifecycle of plugins: validate, init, run, stop, cleanup.
#[derive(Debug)]
pub struct PluginManager {
    /// Shared host tables and hardware.
    host: Arc<Host>,
    /// Loaded plugins.
    registry: Arc<PluginRegistry>,
    /// Slug → running service task.
    tasks: Mutex<HashMap<String, ServiceHandle>>,
    /// Slug → input hook registered for a `Hook` plugin.
    adapters: Mutex<HashMap<String, HookId>>,
    config: PluginConfig,
}

impl PluginManager {
    /// Creates a new plugin manager over `host`.
    pub fn new(host: Arc<Host>, config: PluginConfig) -> Self {
        Self {
            host,
            registry: Arc::new(PluginRegistry::new()),
            tasks: Mutex::new(HashMap::new()),
            adapters: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Validates, initializes and starts a plugin.
    ///
    /// If `init` fails, everything the plugin registered or claimed so far
    /// is removed and `InitFailed` is returned.
    pub async fn load(&self, plugin: Arc<dyn Plugin>) -> HostResult<()> {
        let descriptor = plugin.info();
        descriptor.check().inspect_err(|e| {
            error!(plugin = %descriptor.slug, error = %e, "Plugin rejected");
        })?;

        let slug = descriptor.slug.clone();
        let plugin_type = descriptor.plugin_type;
        let ctx = PluginContext::new(slug.as_str(), self.host.clone());

        self.registry
            .insert(plugin.clone(), descriptor, ctx.clone())
            .await?;

        if let Err(e) = self.host.admit(&slug) {
            self.registry.remove(&slug).await;
            return Err(e);
        }

        // Init
        if let Err(e) = plugin.init(&ctx).await {
            let rolled_back = self.host.purge_owner(&slug);
            self.registry.remove(&slug).await;
            error!(
                plugin = %slug,
                error = %e,
                hooks = rolled_back.hooks,
                widgets = rolled_back.widgets,
                claims = rolled_back.claims.len(),
                "Plugin init failed; rolled back"
            );
            return Err(e.context(
                ErrorKind::InitFailed,
                format!("Plugin '{slug}' init failed"),
            ));
        }

        // Start
        match plugin_type {
            PluginType::Service => {
                let task_plugin = plugin.clone();
                let task_ctx = ctx.clone();
                let handle = tokio::spawn(async move { task_plugin.service_run(task_ctx).await });
                self.tasks.lock().insert(slug.clone(), handle);
            }
            PluginType::Hook => {
                let adapter = PluginHookAdapter::wrap(plugin.clone(), ctx.clone());
                match self.host.register_hook(&slug, adapter) {
                    Ok(id) => {
                        self.adapters.lock().insert(slug.clone(), id);
                    }
                    Err(e) => {
                        plugin.cleanup(&ctx).await;
                        self.host.purge_owner(&slug);
                        self.registry.remove(&slug).await;
                        error!(plugin = %slug, error = %e, "Plugin hook registration failed");
                        return Err(e.context(
                            ErrorKind::InitFailed,
                            format!("Plugin '{slug}' could not register its input hook"),
                        ));
                    }
                }
            }
            PluginType::Menu => {}
        }

        self.registry.set_state(&slug, PluginState::Running).await?;

        info!(
            plugin = %slug,
            kind = %plugin_type,
            "Plugin loaded and started"
        );

        Ok(())
    }

    /// Stops and unloads a plugin.
    pub async fn unload(&self, slug: &str) -> HostResult<()> {
        let (plugin, ctx) = self.registry.begin_stop(slug).await?;

        // Stop
        ctx.request_stop();
        if let Some(id) = self.adapters.lock().remove(slug) {
            if let Err(e) = self.host.unregister_hook(slug, id) {
                warn!(plugin = %slug, error = %e, "Failed to remove plugin input hook");
            }
        }

        let handle = self.tasks.lock().remove(slug);
        if let Some(mut handle) = handle {
            let timeout = Duration::from_millis(self.config.stop_timeout_ms);
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(joined) => log_service_exit(slug, joined),
                Err(_) => {
                    let revoked = self.host.purge_owner(slug);
                    error!(
                        plugin = %slug,
                        timeout_ms = self.config.stop_timeout_ms,
                        hooks = revoked.hooks,
                        widgets = revoked.widgets,
                        claims = revoked.claims.len(),
                        "Service loop did not stop; registrations revoked"
                    );
                    self.spawn_reaper(slug.to_string(), plugin, ctx, handle);
                    return Err(HostError::service_unresponsive(format!(
                        "Plugin '{slug}' did not stop within {} ms",
                        self.config.stop_timeout_ms
                    )));
                }
            }
        }

        // Cleanup
        plugin.cleanup(&ctx).await;

        let leftover = self.host.purge_owner(slug);
        if !leftover.is_empty() {
            warn!(
                plugin = %slug,
                hooks = leftover.hooks,
                widgets = leftover.widgets,
                claims = leftover.claims.len(),
                "Plugin left registrations behind after cleanup"
            );
        }

        self.registry.remove(slug).await;

        info!(plugin = %slug, "Plugin unloaded");

        Ok(())
    }

    /// Waits for an unresponsive service loop to exit, then runs cleanup.
    fn spawn_reaper(
        &self,
        slug: String,
        plugin: Arc<dyn Plugin>,
        ctx: PluginContext,
        handle: ServiceHandle,
    ) {
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let joined = handle.await;
            log_service_exit(&slug, joined);
            plugin.cleanup(&ctx).await;
            registry.remove(&slug).await;
            info!(plugin = %slug, "Unresponsive plugin reaped");
        });
    }

    /// Loads every plugin flagged `AUTOSTART` that is not disabled.
    ///
    /// Returns the slugs that loaded. Failures are logged and skipped.
    pub async fn load_all(&self, plugins: Vec<Arc<dyn Plugin>>) -> Vec<String> {
        let mut loaded = Vec::new();

        for plugin in plugins {
            let descriptor = plugin.info();
            if !descriptor.flags.contains(PluginFlags::AUTOSTART) {
                continue;
            }
            if self.config.is_disabled(&descriptor.slug) {
                info!(plugin = %descriptor.slug, "Plugin disabled by configuration");
                continue;
            }

            match self.load(plugin).await {
                Ok(()) => loaded.push(descriptor.slug),
                Err(e) => {
                    error!(plugin = %descriptor.slug, error = %e, "Error loading plugin");
                }
            }
        }

        info!(count = loaded.len(), "Plugins loaded");
        loaded
    }

    /// Stops and unloads all plugins, most recently loaded first.
    pub async fn unload_all(&self) {
        let slugs = self.registry.slugs().await;

        for slug in slugs.iter().rev() {
            if self.registry.state(slug).await != PluginState::Running {
                continue;
            }
            if let Err(e) = self.unload(slug).await {
                error!(plugin = %slug, error = %e, "Error unloading plugin");
            }
        }

        info!("All plugins unloaded");
    }

    /// Lists all loaded plugins with what they currently hold.
    pub async fn list_plugins(&self) -> Vec<PluginStatus> {
        let mut statuses = self.registry.list().await;
        for status in &mut statuses {
            status.holdings = self.host.holdings(&status.descriptor.slug);
        }
        statuses
    }

    /// Lifecycle state of a plugin.
    pub async fn state(&self, slug: &str) -> PluginState {
        self.registry.state(slug).await
    }

    /// Returns whether a plugin is running.
    pub async fn is_loaded(&self, slug: &str) -> bool {
        self.registry.state(slug).await == PluginState::Running
    }

    /// Draws a `Menu` plugin's menu.
    pub async fn render_menu(&self, slug: &str, canvas: &mut dyn Canvas) -> HostResult<()> {
        let (plugin, ctx) = self.running_menu(slug).await?;
        plugin.menu_render(&ctx, canvas);
        Ok(())
    }

    /// Forwards a menu selection to a `Menu` plugin.
    pub async fn select_menu(&self, slug: &str) -> HostResult<()> {
        let (plugin, ctx) = self.running_menu(slug).await?;
        plugin.menu_select(&ctx);
        Ok(())
    }

    async fn running_menu(&self, slug: &str) -> HostResult<(Arc<dyn Plugin>, PluginContext)> {
        if self.registry.state(slug).await != PluginState::Running {
            return Err(HostError::not_found(format!(
                "Plugin '{slug}' is not running"
            )));
        }
        let (plugin, ctx) = self
            .registry
            .get(slug)
            .await
            .ok_or_else(|| HostError::not_found(format!("Plugin '{slug}' not found")))?;

        if plugin.info().plugin_type != PluginType::Menu {
            return Err(HostError::validation(format!(
                "Plugin '{slug}' is not a menu plugin"
            )));
        }
        Ok((plugin, ctx))
    }

    /// Returns the shared host.
    pub fn host(&self) -> &Arc<Host> {
        &self.host
    }

    /// Returns the plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

fn log_service_exit(slug: &str, joined: Result<HostResult<()>, JoinError>) {
    match joined {
        Ok(Ok(())) => info!(plugin = %slug, "Service loop stopped"),
        Ok(Err(e)) => error!(plugin = %slug, error = %e, "Service loop returned an error"),
        Err(e) if e.is_panic() => error!(plugin = %slug, "Service loop panicked"),
        Err(e) => warn!(plugin = %slug, error = %e, "Service loop cancelled"),
    }
}
