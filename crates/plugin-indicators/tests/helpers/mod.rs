//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tanmatsu_core::ManualClock;
use tanmatsu_core::config::HostConfig;
use tanmatsu_plugin::{Host, MemoryLedStrip, PluginManager};

/// Test host context
pub struct TestHost {
    pub host: Arc<Host>,
    pub manager: PluginManager,
    pub strip: MemoryLedStrip,
    pub clock: Arc<ManualClock>,
}

impl TestHost {
    /// Create a host whose clock starts at `start_ms`
    pub fn starting_at(start_ms: u32) -> Self {
        let config = HostConfig::default();
        let strip = MemoryLedStrip::new(config.leds.count);
        let clock = Arc::new(ManualClock::new(start_ms));
        let host = Arc::new(Host::new(&config, Box::new(strip.clone()), clock.clone()));
        let manager = PluginManager::new(host.clone(), config.plugins.clone());
        Self {
            host,
            manager,
            strip,
            clock,
        }
    }

    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Let the plugin service loops run for `ms` of paused time
    pub async fn run_for(&self, ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}
