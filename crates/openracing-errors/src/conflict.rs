//! Errors for requests rejected because of the current state.

use crate::common::ErrorSeverity;

/// Conflict errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// A detection session for the action is still listening
    #[error("Detection already in progress for {0}")]
    SessionActive(String),

    /// The device is referenced by at least one binding
    #[error("Device {0} is used by a binding")]
    DeviceInUse(String),

    /// Session identifier that was never issued
    #[error("Detection session not found: {0}")]
    SessionNotFound(String),
}

impl ConflictError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConflictError::SessionNotFound(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Warning,
        }
    }

    /// Create a session active error.
    pub fn session_active(action: impl Into<String>) -> Self {
        ConflictError::SessionActive(action.into())
    }

    /// Create a device in use error.
    pub fn device_in_use(device: impl Into<String>) -> Self {
        ConflictError::DeviceInUse(device.into())
    }
}
