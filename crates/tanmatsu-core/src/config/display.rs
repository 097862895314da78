//! Status bar geometry.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Geometry of the launcher header that hosts status widgets.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Left edge of the header in pixels.
    #[serde(default)]
    #[validate(range(min = 0, max = 4096))]
    pub header_x: i32,
    /// Top edge of the header in pixels.
    #[serde(default)]
    #[validate(range(min = 0, max = 4096))]
    pub header_y: i32,
    /// Header width in pixels; widgets pack leftwards from its right edge.
    #[serde(default = "default_header_width")]
    #[validate(range(min = 1, max = 4096))]
    pub header_width: u32,
    /// Header height in pixels.
    #[serde(default = "default_header_height")]
    #[validate(range(min = 1, max = 512))]
    pub header_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            header_x: 0,
            header_y: 0,
            header_width: default_header_width(),
            header_height: default_header_height(),
        }
    }
}

fn default_header_width() -> u32 {
    800
}

fn default_header_height() -> u32 {
    32
}
