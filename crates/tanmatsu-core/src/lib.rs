//! # tanmatsu-core
//!
//! Core crate for the Tanmatsu plugin host. Contains the configuration
//! schema, the wrap-aware millisecond tick clock, and the unified error
//! system shared by the host and its plugins.
//!
//! This crate has **no** internal dependencies on other Tanmatsu crates.

pub mod config;
pub mod error;
pub mod result;
pub mod tick;

pub use error::{ErrorKind, HostError};
pub use result::HostResult;
pub use tick::{
    ManualClock, MonotonicClock, TickSource, deadline_after, deadline_passed, elapsed_since,
};
