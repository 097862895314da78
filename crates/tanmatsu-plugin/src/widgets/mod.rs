//! Status bar widgets — drawing surface, widget table, and header renderer.

pub mod canvas;
pub mod renderer;
pub mod table;

pub use canvas::{Canvas, Color, DrawOp, Rect, RecordingCanvas};
pub use renderer::{HeaderBounds, RenderReport, WidgetPlacement, WidgetRenderer};
pub use table::{StatusWidget, WidgetId, WidgetSlot, WidgetTable};
