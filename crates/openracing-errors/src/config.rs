//! Errors for requests that can never succeed as written.
//!
//! These are returned synchronously and no state is mutated when one is
//! produced.

use crate::common::ErrorSeverity;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Action name does not denote any binding entry or gear
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Index outside the accepted range for its field
    #[error("Invalid {field} index: {value}")]
    BadIndex {
        /// Which index was rejected (controller, axis, button, device)
        field: String,
        /// The rejected value
        value: i64,
    },

    /// Gear key that is not one of GEAR_1..GEAR_7, GEAR_R
    #[error("Invalid shifter gear: {0}")]
    InvalidGear(String),

    /// The action cannot be bound to this kind of input
    #[error("Action {action} cannot be bound to {input}")]
    WrongInputKind {
        /// Action name
        action: String,
        /// Input kind that was offered ("axis" or "button")
        input: String,
    },

    /// Neither an axis nor a button was supplied
    #[error("Action {0} requires an axis or button index")]
    MissingInput(String),

    /// Malformed line or value in a controls file
    #[error("Malformed controls file at line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// Key code that is not a hex virtual-key value
    #[error("Invalid key code: {0}")]
    InvalidKeyCode(String),

    /// A configuration value failed validation
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting {
        /// Setting name
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigurationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigurationError::Malformed { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create an unknown action error.
    pub fn unknown_action(action: impl Into<String>) -> Self {
        ConfigurationError::UnknownAction(action.into())
    }

    /// Create a bad index error.
    pub fn bad_index(field: impl Into<String>, value: i64) -> Self {
        ConfigurationError::BadIndex {
            field: field.into(),
            value,
        }
    }

    /// Create a wrong input kind error.
    pub fn wrong_input(action: impl Into<String>, input: impl Into<String>) -> Self {
        ConfigurationError::WrongInputKind {
            action: action.into(),
            input: input.into(),
        }
    }

    /// Create an invalid setting error.
    pub fn invalid_setting(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidSetting {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
