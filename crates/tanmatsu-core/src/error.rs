//! Unified error types for the plugin host.
//!
//! Every layer of the host maps its failures into [`HostError`] so that
//! plugin calls, lifecycle operations and configuration loading all
//! propagate through the `?` operator with one error type.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A hook or widget table is at capacity.
    RegistrationFailed,
    /// The resource is already claimed by another plugin.
    ClaimDenied,
    /// The caller does not own the registration or claim it tried to touch.
    NotOwner,
    /// A plugin's init reported failure.
    InitFailed,
    /// A service loop ignored the stop signal past its timeout.
    ServiceUnresponsive,
    /// The requested plugin or entry was not found.
    NotFound,
    /// Plugin metadata or an argument failed validation.
    Validation,
    /// A conflicting plugin is already loaded or still stopping.
    Conflict,
    /// An output device (LED strip, display) reported an error.
    Hardware,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistrationFailed => write!(f, "REGISTRATION_FAILED"),
            Self::ClaimDenied => write!(f, "CLAIM_DENIED"),
            Self::NotOwner => write!(f, "NOT_OWNER"),
            Self::InitFailed => write!(f, "INIT_FAILED"),
            Self::ServiceUnresponsive => write!(f, "SERVICE_UNRESPONSIVE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Hardware => write!(f, "HARDWARE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout the host.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct HostError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HostError {
    /// Create a new host error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new host error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a registration error for a full hook table.
    pub fn hook_limit_exceeded(capacity: usize) -> Self {
        Self::new(
            ErrorKind::RegistrationFailed,
            format!("Hook limit exceeded ({capacity} hooks registered)"),
        )
    }

    /// Create a registration error for a full widget table.
    pub fn widget_limit_exceeded(capacity: usize) -> Self {
        Self::new(
            ErrorKind::RegistrationFailed,
            format!("Widget limit exceeded ({capacity} widgets registered)"),
        )
    }

    /// Create a claim-denied error.
    pub fn claim_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClaimDenied, message)
    }

    /// Create a not-owner error.
    pub fn not_owner(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotOwner, message)
    }

    /// Create a service-unresponsive error.
    pub fn service_unresponsive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnresponsive, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a hardware error.
    pub fn hardware(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hardware, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Wraps this error as the cause of a new error of another kind.
    pub fn context(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_source(kind, message, self)
    }
}

impl Clone for HostError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for HostError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for HostError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}
