//! Centralized error types for the wheel binding tools
//!
//! Every crate in the binder workspace reports failures through the types in
//! this crate so callers can tell a bad request from a misbehaving device or
//! a concurrent request that lost a race.
//!
//! # Architecture
//!
//! - [`common`]: the umbrella [`BinderError`], severity and category
//! - [`config`]: requests that can never succeed as written
//! - [`device`]: open and poll failures reported by the input layer
//! - [`conflict`]: requests rejected because of current state
//!
//! Timeouts and cancellations of a detection session are not errors; they are
//! terminal session states and never surface through these types.
//!
//! # Example
//!
//! ```
//! use openracing_errors::prelude::*;
//!
//! fn parse_axis(number: i32) -> Result<u32> {
//!     if number < 1 {
//!         return Err(ConfigurationError::bad_index("axis", i64::from(number)).into());
//!     }
//!     Ok(number.unsigned_abs() - 1)
//! }
//!
//! assert!(parse_axis(0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod config;
pub mod conflict;
pub mod device;
pub mod prelude;

pub use common::{BinderError, ErrorCategory, ErrorSeverity};
pub use config::ConfigurationError;
pub use conflict::ConflictError;
pub use device::DeviceError;

/// A specialized `Result` type for binder operations.
pub type Result<T> = std::result::Result<T, BinderError>;
