//! Plugin lifecycle configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Plugin lifecycle and callback table configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Maximum number of input hooks registered across all plugins.
    #[serde(default = "default_max_hooks")]
    #[validate(range(min = 1, max = 64))]
    pub max_hooks: usize,
    /// Maximum number of status bar widgets registered across all plugins.
    #[serde(default = "default_max_widgets")]
    #[validate(range(min = 1, max = 32))]
    pub max_widgets: usize,
    /// How long unload waits for a service loop to observe its stop signal.
    #[serde(default = "default_stop_timeout")]
    #[validate(range(min = 10, max = 60000))]
    pub stop_timeout_ms: u64,
    /// Slugs skipped by `load_all`.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PluginConfig {
    /// Returns whether the given slug is disabled.
    pub fn is_disabled(&self, slug: &str) -> bool {
        self.disabled.iter().any(|s| s == slug)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            max_hooks: default_max_hooks(),
            max_widgets: default_max_widgets(),
            stop_timeout_ms: default_stop_timeout(),
            disabled: Vec::new(),
        }
    }
}

fn default_max_hooks() -> usize {
    16
}

fn default_max_widgets() -> usize {
    8
}

fn default_stop_timeout() -> u64 {
    1000
}
