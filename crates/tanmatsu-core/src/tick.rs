//! Wrap-aware millisecond tick clock.
//!
//! The launcher exposes time to plugins as a 32-bit millisecond counter,
//! which wraps roughly every 49.7 days. Comparing ticks with `>=` breaks at
//! the wrap point, so every deadline check goes through [`deadline_passed`],
//! which compares the signed distance between the two ticks instead.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Source of the monotonic millisecond tick.
pub trait TickSource: Send + Sync + fmt::Debug {
    /// Returns the current tick in milliseconds, wrapping at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

/// Returns whether `now` is at or after `deadline`.
///
/// Correct across the counter wrap as long as the two ticks are less than
/// `2^31` milliseconds (about 24.8 days) apart.
pub fn deadline_passed(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Returns the tick `delay_ms` milliseconds after `now`.
pub fn deadline_after(now: u32, delay_ms: u32) -> u32 {
    now.wrapping_add(delay_ms)
}

/// Milliseconds elapsed from `earlier` to `now`, across the wrap.
pub fn elapsed_since(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}

/// Tick source backed by [`Instant`].
///
/// The optional start offset lets the counter begin anywhere in the `u32`
/// range, e.g. just before the wrap.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    /// Instant corresponding to tick `offset`.
    origin: Instant,
    /// Tick value at `origin`.
    offset: u32,
}

impl MonotonicClock {
    /// Creates a clock that starts at tick 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a clock whose first reading is `offset`.
    pub fn starting_at(offset: u32) -> Self {
        Self {
            origin: Instant::now(),
            offset,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn now_ms(&self) -> u32 {
        let elapsed = self.origin.elapsed().as_millis() as u64;
        // Truncation to 32 bits is the wrap.
        (elapsed.wrapping_add(self.offset as u64)) as u32
    }
}

/// Tick source advanced by hand, for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU32,
}

impl ManualClock {
    /// Creates a manual clock at `start`.
    pub fn new(start: u32) -> Self {
        Self {
            now: AtomicU32::new(start),
        }
    }

    /// Sets the current tick.
    pub fn set(&self, now: u32) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advances the clock, wrapping at `u32::MAX`, and returns the new tick.
    pub fn advance(&self, ms: u32) -> u32 {
        let previous = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| Some(t.wrapping_add(ms)))
            .unwrap_or_else(|t| t);
        previous.wrapping_add(ms)
    }
}

impl TickSource for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}
