//! Widget table — status bar widgets keyed by [`WidgetId`].

use std::sync::Arc;

use tracing::{debug, info};

use tanmatsu_core::{HostError, HostResult};

use super::canvas::{Canvas, Rect};
use crate::arena::{CallbackArena, Removal, define_handle};

define_handle!(
    /// Host-assigned handle of a registered status widget.
    WidgetId
);

/// The region offered to one widget during a header redraw.
///
/// Widgets are packed right-to-left: `right` is the exclusive right edge
/// of the space still free, and a widget that consumes `w` pixels should
/// draw inside `right - w .. right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSlot {
    /// Exclusive right edge of the free space.
    pub right: i32,
    /// Top edge of the header.
    pub y: i32,
    /// Header height.
    pub height: u32,
    /// Free width left of `right`.
    pub available: u32,
}

impl WidgetSlot {
    /// Left x coordinate for a widget consuming `width` pixels.
    pub fn draw_x(&self, width: u32) -> i32 {
        self.right - width.min(self.available) as i32
    }

    /// The rectangle a widget of `width` pixels occupies.
    pub fn region(&self, width: u32) -> Rect {
        let width = width.min(self.available);
        Rect::new(self.right - width as i32, self.y, width, self.height)
    }
}

/// Trait for status bar widget implementations.
pub trait StatusWidget: Send + Sync {
    /// Draws the widget into `slot` and returns the width it consumed.
    ///
    /// Returning 0 is allowed; the widget is still invoked on every redraw.
    fn render(&self, canvas: &mut dyn Canvas, slot: WidgetSlot) -> u32;
}

impl std::fmt::Debug for dyn StatusWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<status widget>")
    }
}

/// Bounded table of status widgets.
#[derive(Debug)]
pub struct WidgetTable {
    arena: CallbackArena<Arc<dyn StatusWidget>>,
}

impl WidgetTable {
    /// Creates an empty table holding at most `capacity` widgets.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: CallbackArena::new(capacity),
        }
    }

    /// Registers a widget on behalf of `owner`.
    pub fn register(&mut self, widget: Arc<dyn StatusWidget>, owner: &str) -> HostResult<WidgetId> {
        let id = self
            .arena
            .insert(owner, widget)
            .ok_or_else(|| HostError::widget_limit_exceeded(self.arena.capacity()))?;

        info!(plugin = %owner, widget_id = id, "Status widget registered");
        Ok(WidgetId(id))
    }

    /// Unregisters a widget; same ownership rules as hooks.
    pub fn unregister(&mut self, id: WidgetId, caller: &str) -> HostResult<()> {
        match self.arena.remove(id.0, caller) {
            Removal::Removed => {
                info!(plugin = %caller, widget_id = id.0, "Status widget unregistered");
                Ok(())
            }
            Removal::Missing => {
                debug!(plugin = %caller, widget_id = id.0, "Status widget already unregistered");
                Ok(())
            }
            Removal::Foreign { owner } => Err(HostError::not_owner(format!(
                "Widget {id} belongs to '{owner}', not '{caller}'"
            ))),
        }
    }

    /// Removes every widget owned by `owner`.
    pub fn unregister_owner(&mut self, owner: &str) -> usize {
        self.arena.remove_owner(owner)
    }

    /// Returns whether the widget is still registered.
    pub fn is_live(&self, id: WidgetId) -> bool {
        self.arena.contains(id.0)
    }

    /// Clones the live widgets in registration order.
    pub fn snapshot(&self) -> Vec<(WidgetId, String, Arc<dyn StatusWidget>)> {
        self.arena
            .snapshot()
            .into_iter()
            .map(|(id, entry)| (WidgetId(id), entry.owner, entry.callback))
            .collect()
    }

    /// Number of widgets owned by `owner`.
    pub fn count_owned(&self, owner: &str) -> usize {
        self.arena.count_owned(owner)
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns whether no widgets are registered.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
