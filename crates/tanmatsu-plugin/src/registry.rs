//! Plugin registry — descriptors, lifecycle states, and loaded plugin instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use validator::{Validate, ValidationError};

use tanmatsu_core::{HostError, HostResult};

use crate::api::context::PluginContext;
use crate::hooks::definitions::{HookAction, InputEvent};
use crate::host::Holdings;
use crate::widgets::canvas::Canvas;

/// Plugin API version this host implements.
pub const PLUGIN_API_VERSION: u32 = 1;

/// How the launcher drives a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    /// Runs a background service loop.
    Service,
    /// Renders into and reacts to the launcher menu.
    Menu,
    /// Receives every input event through an input hook.
    Hook,
}

impl std::fmt::Display for PluginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Menu => write!(f, "menu"),
            Self::Hook => write!(f, "hook"),
        }
    }
}

/// Descriptor flag bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginFlags(pub u32);

impl PluginFlags {
    pub const NONE: PluginFlags = PluginFlags(0);
    /// Loaded by `PluginManager::load_all`.
    pub const AUTOSTART: PluginFlags = PluginFlags(1 << 0);
    pub const NEEDS_LEDS: PluginFlags = PluginFlags(1 << 1);
    pub const NEEDS_INPUT: PluginFlags = PluginFlags(1 << 2);

    /// Returns whether every bit of `other` is set.
    pub const fn contains(self, other: PluginFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PluginFlags {
    type Output = PluginFlags;

    fn bitor(self, rhs: PluginFlags) -> PluginFlags {
        PluginFlags(self.0 | rhs.0)
    }
}

/// Static metadata a plugin reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PluginDescriptor {
    /// Human-readable name.
    #[validate(length(min = 1, message = "Plugin name is required"))]
    pub name: String,
    /// Unique identifier.
    #[validate(
        length(min = 1, max = 32),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    pub version: String,
    pub author: String,
    pub description: String,
    /// Plugin API version the plugin was built against.
    pub api_version: u32,
    pub plugin_type: PluginType,
    pub flags: PluginFlags,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("slug_charset"))
    }
}

impl PluginDescriptor {
    /// Validates the descriptor fields and the API version.
    pub fn check(&self) -> HostResult<()> {
        self.validate().map_err(|e| {
            HostError::validation(format!("Invalid descriptor for '{}': {e}", self.slug))
        })?;

        if self.api_version != PLUGIN_API_VERSION {
            return Err(HostError::validation(format!(
                "Plugin '{}' targets API version {}, host provides {}",
                self.slug, self.api_version, PLUGIN_API_VERSION
            )));
        }
        Ok(())
    }
}

/// Lifecycle state of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Unloaded,
    Initializing,
    Running,
    Stopping,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// A loaded plugin as reported by `PluginManager::list_plugins`.
#[derive(Debug, Clone, Serialize)]
pub struct PluginStatus {
    pub descriptor: PluginDescriptor,
    pub state: PluginState,
    pub loaded_at: DateTime<Utc>,
    /// What the plugin currently holds in the host tables.
    pub holdings: Holdings,
}

/// Trait that all plugins must implement.
///
/// `init` and `cleanup` bracket the plugin's time in the host: whatever
/// `init` registers or claims, `cleanup` should unregister or release.
/// The host force-removes anything left behind.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns the plugin descriptor.
    fn info(&self) -> PluginDescriptor;

    /// Called once when the plugin is loaded.
    async fn init(&self, ctx: &PluginContext) -> HostResult<()>;

    /// Called once after the plugin has stopped.
    async fn cleanup(&self, ctx: &PluginContext);

    /// Service loop for `Service` plugins. Should return soon after
    /// `ctx.should_stop()` becomes true.
    async fn service_run(&self, ctx: PluginContext) -> HostResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Draws the plugin's menu for `Menu` plugins.
    fn menu_render(&self, ctx: &PluginContext, canvas: &mut dyn Canvas) {
        let _ = (ctx, canvas);
    }

    /// Handles selection of the plugin's menu entry.
    fn menu_select(&self, ctx: &PluginContext) {
        let _ = ctx;
    }

    /// Handles an input event for `Hook` plugins.
    fn hook_event(&self, ctx: &PluginContext, event: &InputEvent) -> HookAction {
        let _ = (ctx, event);
        HookAction::Continue
    }
}

/// A loaded plugin and its bookkeeping.
#[derive(Debug, Clone)]
struct PluginRecord {
    plugin: Arc<dyn Plugin>,
    descriptor: PluginDescriptor,
    state: PluginState,
    loaded_at: DateTime<Utc>,
    /// Load order.
    seq: u64,
    context: PluginContext,
}

/// Registry of all loaded plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Plugin slug → record.
    records: RwLock<HashMap<String, PluginRecord>>,
    next_seq: AtomicU64,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a plugin in the `Initializing` state.
    pub async fn insert(
        &self,
        plugin: Arc<dyn Plugin>,
        descriptor: PluginDescriptor,
        context: PluginContext,
    ) -> HostResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&descriptor.slug) {
            return Err(HostError::conflict(format!(
                "Plugin '{}' is already loaded",
                descriptor.slug
            )));
        }

        info!(
            plugin = %descriptor.slug,
            name = %descriptor.name,
            version = %descriptor.version,
            kind = %descriptor.plugin_type,
            "Registering plugin"
        );

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        records.insert(
            descriptor.slug.clone(),
            PluginRecord {
                plugin,
                descriptor,
                state: PluginState::Initializing,
                loaded_at: Utc::now(),
                seq,
                context,
            },
        );
        Ok(())
    }

    /// Updates the state of a loaded plugin.
    pub async fn set_state(&self, slug: &str, state: PluginState) -> HostResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(slug)
            .ok_or_else(|| HostError::not_found(format!("Plugin '{slug}' not found")))?;
        record.state = state;
        Ok(())
    }

    /// Moves a running plugin to `Stopping` and returns it with its context.
    ///
    /// Fails with `Conflict` if the plugin is not `Running`, so at most one
    /// caller ever drives a plugin's shutdown.
    pub async fn begin_stop(&self, slug: &str) -> HostResult<(Arc<dyn Plugin>, PluginContext)> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(slug)
            .ok_or_else(|| HostError::not_found(format!("Plugin '{slug}' not found")))?;

        if record.state != PluginState::Running {
            return Err(HostError::conflict(format!(
                "Plugin '{slug}' is {}, not running",
                record.state
            )));
        }
        record.state = PluginState::Stopping;
        Ok((record.plugin.clone(), record.context.clone()))
    }

    /// Gets a plugin and its context by slug.
    pub async fn get(&self, slug: &str) -> Option<(Arc<dyn Plugin>, PluginContext)> {
        let records = self.records.read().await;
        records
            .get(slug)
            .map(|r| (r.plugin.clone(), r.context.clone()))
    }

    /// Removes a plugin record. Returns whether it existed.
    pub async fn remove(&self, slug: &str) -> bool {
        let removed = self.records.write().await.remove(slug).is_some();
        if removed {
            info!(plugin = %slug, "Plugin unregistered");
        }
        removed
    }

    /// State of a plugin; `Unloaded` if it is not in the registry.
    pub async fn state(&self, slug: &str) -> PluginState {
        let records = self.records.read().await;
        records
            .get(slug)
            .map(|r| r.state)
            .unwrap_or(PluginState::Unloaded)
    }

    /// Lists all plugins in load order. Holdings are left empty.
    pub async fn list(&self) -> Vec<PluginStatus> {
        let records = self.records.read().await;
        let mut ordered: Vec<&PluginRecord> = records.values().collect();
        ordered.sort_by_key(|r| r.seq);
        ordered
            .into_iter()
            .map(|r| PluginStatus {
                descriptor: r.descriptor.clone(),
                state: r.state,
                loaded_at: r.loaded_at,
                holdings: Holdings::default(),
            })
            .collect()
    }

    /// Slugs in load order.
    pub async fn slugs(&self) -> Vec<String> {
        self.list()
            .await
            .into_iter()
            .map(|s| s.descriptor.slug)
            .collect()
    }
}
