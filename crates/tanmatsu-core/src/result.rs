//! Convenience result type alias for the plugin host.

use crate::error::HostError;

/// A specialized `Result` type for host and plugin operations.
pub type HostResult<T> = Result<T, HostError>;
