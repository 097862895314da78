//! Plugin API — the context handle and hardware interfaces exposed to plugin code.

pub mod context;
pub mod led;

pub use context::PluginContext;
pub use led::{LedDriver, MemoryLedStrip, Rgb};
