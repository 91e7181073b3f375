//! Top-level error type and classification helpers.

use core::fmt;

use crate::{ConfigurationError, ConflictError, DeviceError};

/// Top-level error type that can wrap every binder sub-error.
#[derive(Debug, thiserror::Error)]
pub enum BinderError {
    /// The request was malformed or named something that does not exist
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An input device could not be opened or read
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// The request conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Serialization errors (state files, captures, config)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BinderError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BinderError::Configuration(_) => ErrorCategory::Configuration,
            BinderError::Device(_) => ErrorCategory::Device,
            BinderError::Conflict(_) => ErrorCategory::Conflict,
            BinderError::Io(_) => ErrorCategory::IO,
            BinderError::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BinderError::Configuration(e) => e.severity(),
            BinderError::Device(e) => e.severity(),
            BinderError::Conflict(e) => e.severity(),
            BinderError::Io(_) | BinderError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Whether the same request could succeed later without being changed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BinderError::Conflict(_) => true,
            BinderError::Device(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Create a serialization error with a message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        BinderError::Serialization(msg.into())
    }
}

impl From<std::io::Error> for BinderError {
    fn from(e: std::io::Error) -> Self {
        BinderError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Bad action names, indices, gear keys, malformed files
    Configuration = 0,
    /// Device open and poll failures
    Device = 1,
    /// Concurrent session or in-use device
    Conflict = 2,
    /// I/O errors
    IO = 3,
    /// Serialization errors
    Serialization = 4,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Conflict => write!(f, "Conflict"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Serialization => write!(f, "Serialization"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, system may be in unstable state
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
