//! Header renderer — packs status widgets right-to-left.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use tanmatsu_core::config::DisplayConfig;

use super::canvas::Canvas;
use super::table::{WidgetId, WidgetSlot};
use crate::host::HostTables;

/// Bounds of the launcher header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl HeaderBounds {
    /// Exclusive right edge, where packing starts.
    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }
}

impl From<&DisplayConfig> for HeaderBounds {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            x: config.header_x,
            y: config.header_y,
            width: config.header_width,
            height: config.header_height,
        }
    }
}

/// Where a widget landed during one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetPlacement {
    pub id: WidgetId,
    /// Left edge of the consumed region.
    pub x: i32,
    /// Consumed width after clamping.
    pub width: u32,
}

/// Summary of one header redraw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Placements in invocation order.
    pub placements: Vec<WidgetPlacement>,
    /// Final cursor: the right edge of the space left unused.
    pub cursor: i32,
}

impl RenderReport {
    /// Placement of a given widget, if it was invoked.
    pub fn placement(&self, id: WidgetId) -> Option<&WidgetPlacement> {
        self.placements.iter().find(|p| p.id == id)
    }
}

/// Invokes status widgets for each header redraw.
#[derive(Debug, Clone)]
pub struct WidgetRenderer {
    /// Shared host tables.
    tables: Arc<Mutex<HostTables>>,
}

impl WidgetRenderer {
    /// Creates a renderer over the host tables.
    pub fn new(tables: Arc<Mutex<HostTables>>) -> Self {
        Self { tables }
    }

    /// Renders every live widget, right-to-left, in registration order.
    ///
    /// Each widget receives the current cursor as its right edge; the
    /// cursor moves left by the width it returns. Widths that overflow
    /// the remaining space are clamped, so later widgets get zero space
    /// but are still invoked.
    pub fn render_all(&self, canvas: &mut dyn Canvas, bounds: HeaderBounds) -> RenderReport {
        let widgets = self.tables.lock().widgets.snapshot();
        let mut cursor = bounds.right();
        let mut placements = Vec::with_capacity(widgets.len());

        for (id, owner, widget) in widgets {
            if !self.tables.lock().widgets.is_live(id) {
                continue;
            }

            let available = (cursor - bounds.x).max(0) as u32;
            let slot = WidgetSlot {
                right: cursor,
                y: bounds.y,
                height: bounds.height,
                available,
            };

            let requested = widget.render(canvas, slot);
            let width = if requested > available {
                warn!(
                    plugin = %owner,
                    widget_id = id.0,
                    requested,
                    available,
                    "Widget overflowed the header; width clamped"
                );
                available
            } else {
                requested
            };

            cursor -= width as i32;
            trace!(plugin = %owner, widget_id = id.0, x = cursor, width, "Widget rendered");
            placements.push(WidgetPlacement {
                id,
                x: cursor,
                width,
            });
        }

        RenderReport { placements, cursor }
    }
}
