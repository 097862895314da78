//! LED strip configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Addressable LED strip settings.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct LedConfig {
    /// Number of addressable LEDs; claims outside `0..count` are rejected.
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 256))]
    pub count: u32,
    /// Turn LEDs off when the host force-releases a claim.
    #[serde(default = "default_true")]
    pub blank_on_release: bool,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            blank_on_release: true,
        }
    }
}

fn default_count() -> u32 {
    6
}

fn default_true() -> bool {
    true
}
