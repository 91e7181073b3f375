//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use openracing_errors::prelude::*;
//!
//! fn require_device(count: usize) -> Result<()> {
//!     if count == 0 {
//!         return Err(DeviceError::NoDevices.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_device(1).is_ok());
//! ```

pub use crate::{
    Result,
    common::{BinderError, ErrorCategory, ErrorSeverity},
    config::ConfigurationError,
    conflict::ConflictError,
    device::DeviceError,
};

/// Return early with a configuration error when a condition fails.
#[macro_export]
macro_rules! ensure_config {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($crate::ConfigurationError::from($error).into());
        }
    };
}
