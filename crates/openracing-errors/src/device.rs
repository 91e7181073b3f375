//! Device-related error types.
//!
//! A device error is always local to one device: a single-device detection
//! ends with a failed status, an all-devices detection just drops the device.

use crate::common::ErrorSeverity;

/// Device errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Device could not be opened
    #[error("Failed to open device {device}: {reason}")]
    OpenFailed {
        /// Device name or identifier
        device: String,
        /// Failure reason
        reason: String,
    },

    /// Device was removed while it was being read
    #[error("Device unplugged: {0}")]
    Unplugged(String),

    /// Reading the device failed for another reason
    #[error("Failed to read device {device}: {reason}")]
    PollFailed {
        /// Device name or identifier
        device: String,
        /// Failure reason
        reason: String,
    },

    /// No device is attached
    #[error("No input devices available")]
    NoDevices,

    /// Device index outside the enumerated list
    #[error("Invalid device index {index} ({available} devices attached)")]
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Number of enumerated devices
        available: usize,
    },

    /// Device identifier that matches no known device
    #[error("Device not found: {0}")]
    NotFound(String),
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::Unplugged(_) => ErrorSeverity::Warning,
            DeviceError::NoDevices => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Check if this error indicates the device is unavailable.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::Unplugged(_) | DeviceError::NotFound(_) | DeviceError::NoDevices
        )
    }

    /// Check if retrying the operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeviceError::OpenFailed { .. } | DeviceError::PollFailed { .. } | DeviceError::NoDevices
        )
    }

    /// Create an open failed error.
    pub fn open_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::OpenFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create a poll failed error.
    pub fn poll_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::PollFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(device: impl Into<String>) -> Self {
        DeviceError::NotFound(device.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_severity() {
        assert_eq!(
            DeviceError::Unplugged("wheel".into()).severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            DeviceError::open_failed("wheel", "busy").severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_device_error_is_device_unavailable() {
        assert!(DeviceError::not_found("x").is_device_unavailable());
        assert!(DeviceError::Unplugged("x".into()).is_device_unavailable());
        assert!(!DeviceError::open_failed("x", "y").is_device_unavailable());
    }

    #[test]
    fn test_invalid_index_display() {
        let err = DeviceError::InvalidIndex {
            index: 4,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('2'));
    }
}
