//! Drawing surface handed to widgets and menu plugins.
//!
//! The host does not rasterize anything itself; the launcher supplies a
//! [`Canvas`] backed by its framebuffer. [`RecordingCanvas`] records the
//! calls instead, for tests and headless runs.

use serde::{Deserialize, Serialize};

/// 32-bit ARGB color, `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);
    pub const TRANSPARENT: Color = Color(0x0000_0000);

    /// Builds an opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Alpha component.
    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// Axis-aligned rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Returns whether the point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Drawing primitives provided by the launcher's display layer.
pub trait Canvas {
    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws a filled circle centered at (`cx`, `cy`).
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color);

    /// Draws text with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color);
}

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Color,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: u32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color,
    },
}

/// Canvas that records every call.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drops all recorded calls, e.g. between frames.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color) {
        self.ops.push(DrawOp::Circle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
