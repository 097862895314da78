//! # Plugin Indicators
//!
//! Two small launcher plugins:
//!
//! - [`BlinkIndicator`] blinks a red dot in the status bar.
//! - [`KeyLedPlugin`] flashes an LED on every key press and switches it
//!   off again after a short delay.

use std::sync::Arc;

use tanmatsu_plugin::Plugin;

pub mod blink;
pub mod config;
pub mod key_led;

pub use blink::BlinkIndicator;
pub use config::{BlinkConfig, KeyLedConfig};
pub use key_led::KeyLedPlugin;

/// The bundled plugins with default settings, in load order.
pub fn bundled() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(BlinkIndicator::default()),
        Arc::new(KeyLedPlugin::default()),
    ]
}
