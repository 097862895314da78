//! Exclusive hardware resource claims.

pub mod registry;

pub use registry::{ResourceKind, ResourceRegistry};
