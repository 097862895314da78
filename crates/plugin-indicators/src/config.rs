//! Settings for the indicator plugins.

use serde::{Deserialize, Serialize};
use validator::Validate;

use tanmatsu_plugin::Rgb;

/// Blink indicator settings.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Time between toggles.
    #[validate(range(min = 10, max = 10000))]
    pub interval_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

/// Key-press LED settings.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLedConfig {
    /// LED flashed on key presses.
    pub led_index: u32,
    /// How long the LED stays lit after the last press.
    #[validate(range(min = 1, max = 60000))]
    pub on_ms: u32,
    /// How often the service loop checks the off deadline.
    #[validate(range(min = 1, max = 1000))]
    pub poll_ms: u32,
    /// Color while lit.
    pub color: Rgb,
}

impl Default for KeyLedConfig {
    fn default() -> Self {
        Self {
            led_index: 0,
            on_ms: 200,
            poll_ms: 10,
            color: Rgb::new(255, 255, 255),
        }
    }
}
