//! Blink indicator — a red dot in the status bar toggled by a service loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};
use validator::Validate;

use tanmatsu_plugin::prelude::*;

use crate::config::BlinkConfig;

/// Width the blink widget reserves in the header, lit or not.
pub const WIDGET_WIDTH: u32 = 16;
const DOT_RADIUS: u32 = 6;

/// Service plugin that blinks a red dot in the status bar.
#[derive(Debug)]
pub struct BlinkIndicator {
    config: BlinkConfig,
    /// Whether the dot is currently drawn.
    lit: Arc<AtomicBool>,
    widget: Mutex<Option<WidgetId>>,
}

impl BlinkIndicator {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            lit: Arc::new(AtomicBool::new(false)),
            widget: Mutex::new(None),
        }
    }

    /// Whether the dot is currently drawn.
    pub fn is_lit(&self) -> bool {
        self.lit.load(Ordering::Acquire)
    }
}

impl Default for BlinkIndicator {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

/// Draws the dot vertically centered in the slot while lit.
fn blink_widget(lit: Arc<AtomicBool>) -> Arc<dyn StatusWidget> {
    widget_fn(move |canvas, slot| {
        if lit.load(Ordering::Acquire) {
            let x = slot.draw_x(WIDGET_WIDTH);
            let cy = slot.y + slot.height as i32 / 2;
            canvas.draw_circle(x + WIDGET_WIDTH as i32 / 2, cy, DOT_RADIUS, Color::RED);
        }
        WIDGET_WIDTH
    })
}

#[async_trait]
impl Plugin for BlinkIndicator {
    fn info(&self) -> PluginDescriptor {
        plugin_descriptor!(
            slug: "blink-indicator",
            name: "Blink Indicator",
            version: "1.0.0",
            author: "Tanmatsu Launcher Team",
            description: "Blinking red circle in status bar",
            kind: Service,
            flags: AUTOSTART
        )
    }

    async fn init(&self, ctx: &PluginContext) -> HostResult<()> {
        self.config.validate()?;

        let id = ctx
            .status_widget_register(blink_widget(self.lit.clone()))
            .inspect_err(|_| ctx.log_error("Failed to register status widget"))?;
        *self.widget.lock() = Some(id);

        info!(plugin = %ctx.slug(), widget_id = id.0, "Blink indicator initialized");
        Ok(())
    }

    async fn cleanup(&self, ctx: &PluginContext) {
        self.lit.store(false, Ordering::Release);

        let widget = self.widget.lock().take();
        if let Some(id) = widget {
            if let Err(e) = ctx.status_widget_unregister(id) {
                ctx.log_warn(&format!("Failed to unregister widget {id}: {e}"));
            }
        }

        ctx.log_info("Blink indicator cleaned up");
    }

    async fn service_run(&self, ctx: PluginContext) -> HostResult<()> {
        debug!(plugin = %ctx.slug(), interval_ms = self.config.interval_ms, "Blink service starting");

        loop {
            self.lit.fetch_xor(true, Ordering::AcqRel);
            ctx.display_flush();

            if !ctx.delay_ms(self.config.interval_ms).await {
                break;
            }
        }

        debug!(plugin = %ctx.slug(), "Blink service stopped");
        Ok(())
    }
}
