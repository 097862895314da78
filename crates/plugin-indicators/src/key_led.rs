//! Key-press LED — lights an LED on every key press and switches it off
//! once the press is `on_ms` old.
//!
//! The input hook lights the LED and moves the off deadline; the service
//! loop polls the tick clock and switches the LED off when the deadline
//! has passed. Deadlines use wrap-safe tick arithmetic.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use validator::Validate;

use tanmatsu_plugin::prelude::*;

use crate::config::KeyLedConfig;

/// Lit flag and off deadline. Held across every LED write so the pixel
/// and the flag never disagree.
#[derive(Debug, Default)]
struct LedTimer {
    active: bool,
    /// Tick at which the LED goes dark.
    off_at: u32,
}

/// State shared between the hook, the service loop and cleanup.
#[derive(Debug, Default)]
struct LedState {
    timer: Mutex<LedTimer>,
    hook: Mutex<Option<HookId>>,
}

impl LedState {
    /// Lights the LED and moves the off deadline to `on_ms` from `now`.
    fn light(&self, ctx: &PluginContext, config: &KeyLedConfig, now: u32) -> HostResult<()> {
        let mut timer = self.timer.lock();
        set_led(ctx, config.led_index, config.color)?;
        timer.off_at = deadline_after(now, config.on_ms);
        timer.active = true;
        Ok(())
    }

    /// Switches the LED off if its deadline has passed at `now`.
    ///
    /// Returns whether the LED was switched off.
    fn expire(&self, ctx: &PluginContext, index: u32, now: u32) -> HostResult<bool> {
        let mut timer = self.timer.lock();
        if !timer.active || !deadline_passed(now, timer.off_at) {
            return Ok(false);
        }
        set_led(ctx, index, Rgb::OFF)?;
        timer.active = false;
        Ok(true)
    }

    fn is_active(&self) -> bool {
        self.timer.lock().active
    }
}

/// Service plugin that flashes an LED on key presses.
#[derive(Debug)]
pub struct KeyLedPlugin {
    config: KeyLedConfig,
    state: Arc<LedState>,
}

impl KeyLedPlugin {
    pub fn new(config: KeyLedConfig) -> Self {
        Self {
            config,
            state: Arc::new(LedState::default()),
        }
    }

    /// Whether the LED is currently lit.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl Default for KeyLedPlugin {
    fn default() -> Self {
        Self::new(KeyLedConfig::default())
    }
}

fn set_led(ctx: &PluginContext, index: u32, color: Rgb) -> HostResult<()> {
    ctx.led_set_pixel_rgb(index, color)?;
    ctx.led_send()
}

/// Lights the LED on presses. Never consumes the event.
fn key_hook(ctx: PluginContext, config: KeyLedConfig, state: Arc<LedState>) -> Arc<dyn InputHook> {
    hook_fn(move |event| {
        if !event.is_press() {
            return HookAction::Continue;
        }

        if let Err(e) = state.light(&ctx, &config, ctx.get_tick_ms()) {
            ctx.log_warn(&format!("Failed to light LED: {e}"));
        }
        HookAction::Continue
    })
}

#[async_trait]
impl Plugin for KeyLedPlugin {
    fn info(&self) -> PluginDescriptor {
        plugin_descriptor!(
            slug: "key-led",
            name: "Key LED",
            version: "1.0.0",
            author: "Tanmatsu Launcher Team",
            description: "Flashes an LED on every key press",
            kind: Service,
            flags: AUTOSTART | NEEDS_LEDS | NEEDS_INPUT
        )
    }

    async fn init(&self, ctx: &PluginContext) -> HostResult<()> {
        self.config.validate()?;

        ctx.led_claim(self.config.led_index)?;
        set_led(ctx, self.config.led_index, Rgb::OFF)?;

        let hook = key_hook(ctx.clone(), self.config.clone(), self.state.clone());
        let id = ctx.input_hook_register(hook)?;
        *self.state.hook.lock() = Some(id);

        info!(
            plugin = %ctx.slug(),
            led = self.config.led_index,
            hook_id = id.0,
            "Key LED initialized"
        );
        Ok(())
    }

    async fn cleanup(&self, ctx: &PluginContext) {
        let hook = self.state.hook.lock().take();
        if let Some(id) = hook {
            if let Err(e) = ctx.input_hook_unregister(id) {
                ctx.log_warn(&format!("Failed to unregister hook {id}: {e}"));
            }
        }

        // A press already past dispatch blocks here and then finds the
        // claim gone.
        let mut timer = self.state.timer.lock();
        if let Err(e) = set_led(ctx, self.config.led_index, Rgb::OFF) {
            ctx.log_warn(&format!("Failed to switch LED off: {e}"));
        }
        timer.active = false;

        if let Err(e) = ctx.led_release(self.config.led_index) {
            ctx.log_warn(&format!("Failed to release LED: {e}"));
        }
        drop(timer);

        ctx.log_info("Key LED cleaned up");
    }

    async fn service_run(&self, ctx: PluginContext) -> HostResult<()> {
        debug!(plugin = %ctx.slug(), poll_ms = self.config.poll_ms, "Key LED service starting");

        while ctx.delay_ms(self.config.poll_ms).await {
            self.state.expire(&ctx, self.config.led_index, ctx.get_tick_ms())?;
        }

        debug!(plugin = %ctx.slug(), "Key LED service stopped");
        Ok(())
    }
}
