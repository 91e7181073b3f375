//! Device reading abstraction for input binding
//!
//! The binder never talks to a driver directly. It enumerates devices, opens
//! one by identifier and pulls fixed-shape [`Snapshot`]s on demand through the
//! [`InputSource`] and [`DeviceHandle`] traits. Open and poll failures are
//! plain values ([`OpenFailure`], [`PollFailure`]) so a scan loop can decide
//! whether to drop one device or end its session.
//!
//! [`ScriptedSource`] replays recorded or hand-written frames and backs both
//! the tests and the `--capture` mode of the CLI.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod scripted;
pub mod snapshot;
pub mod source_traits;

pub use device_info::*;
pub use scripted::{HandleCounters, ScriptedDevice, ScriptedSource};
pub use snapshot::*;
pub use source_traits::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputSourceError {
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    #[error("Invalid capture file: {0}")]
    InvalidCapture(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type InputSourceResult<T> = Result<T, InputSourceError>;

impl From<InputSourceError> for openracing_errors::BinderError {
    fn from(err: InputSourceError) -> Self {
        match err {
            InputSourceError::Enumeration(reason) => {
                openracing_errors::DeviceError::poll_failed("device enumeration", reason).into()
            }
            InputSourceError::InvalidCapture(e) => Self::serialization(e.to_string()),
            InputSourceError::IoError(e) => Self::Io(e),
        }
    }
}
