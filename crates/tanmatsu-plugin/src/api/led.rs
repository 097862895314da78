//! LED output driver interface.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use tanmatsu_core::{HostError, HostResult};

/// An RGB triple for one addressable LED.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Creates a color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Driver for the launcher's addressable LED strip.
///
/// Writes are staged with [`set_pixel_rgb`](Self::set_pixel_rgb) and pushed
/// to the hardware by [`send`](Self::send).
pub trait LedDriver: Send {
    /// Number of addressable LEDs.
    fn led_count(&self) -> u32;

    /// Stages a color for one LED.
    fn set_pixel_rgb(&mut self, index: u32, color: Rgb) -> HostResult<()>;

    /// Pushes staged colors to the hardware.
    fn send(&mut self) -> HostResult<()>;
}

/// In-memory LED strip.
///
/// Clones share the same pixels, so a test can keep a handle while the
/// host owns the driver.
#[derive(Debug, Clone)]
pub struct MemoryLedStrip {
    inner: Arc<Mutex<StripState>>,
}

#[derive(Debug)]
struct StripState {
    /// Colors staged since the last send.
    staged: Vec<Rgb>,
    /// Colors as of the last send.
    shown: Vec<Rgb>,
    /// Number of sends performed.
    sends: u64,
}

impl MemoryLedStrip {
    /// Creates a dark strip of `count` LEDs.
    pub fn new(count: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StripState {
                staged: vec![Rgb::OFF; count as usize],
                shown: vec![Rgb::OFF; count as usize],
                sends: 0,
            })),
        }
    }

    /// Colors as of the last send.
    pub fn shown(&self) -> Vec<Rgb> {
        self.inner.lock().shown.clone()
    }

    /// Color of one LED as of the last send.
    pub fn pixel(&self, index: u32) -> Option<Rgb> {
        self.inner.lock().shown.get(index as usize).copied()
    }

    /// Number of sends performed.
    pub fn send_count(&self) -> u64 {
        self.inner.lock().sends
    }
}

impl LedDriver for MemoryLedStrip {
    fn led_count(&self) -> u32 {
        self.inner.lock().staged.len() as u32
    }

    fn set_pixel_rgb(&mut self, index: u32, color: Rgb) -> HostResult<()> {
        let mut state = self.inner.lock();
        let slot = state
            .staged
            .get_mut(index as usize)
            .ok_or_else(|| HostError::hardware(format!("LED index {index} out of range")))?;
        *slot = color;
        Ok(())
    }

    fn send(&mut self) -> HostResult<()> {
        let mut state = self.inner.lock();
        state.shown = state.staged.clone();
        state.sends += 1;
        trace!(sends = state.sends, "LED strip updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_until_send() {
        let strip = MemoryLedStrip::new(3);
        let mut driver = strip.clone();
        driver.set_pixel_rgb(1, Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(strip.pixel(1), Some(Rgb::OFF));

        driver.send().unwrap();
        assert_eq!(strip.pixel(1), Some(Rgb::new(255, 0, 0)));
        assert_eq!(strip.send_count(), 1);
    }

    #[test]
    fn test_out_of_range_is_hardware_error() {
        let mut strip = MemoryLedStrip::new(2);
        let err = strip.set_pixel_rgb(2, Rgb::OFF).unwrap_err();
        assert_eq!(err.kind, tanmatsu_core::ErrorKind::Hardware);
    }
}
