//! Device source traits and the scoped handle guard

use async_trait::async_trait;
use openracing_errors::DeviceError;

use crate::{DeviceDescriptor, InputSourceResult, Snapshot};

/// Why a device could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot open {device}: {reason}")]
pub struct OpenFailure {
    pub device: String,
    pub reason: String,
}

impl OpenFailure {
    pub fn new(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

impl From<OpenFailure> for DeviceError {
    fn from(failure: OpenFailure) -> Self {
        DeviceError::open_failed(failure.device, failure.reason)
    }
}

/// Why a poll tick produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollFailure {
    #[error("device unplugged")]
    Unplugged,

    #[error("{0}")]
    Other(String),
}

impl PollFailure {
    pub fn into_device_error(self, device: &str) -> DeviceError {
        match self {
            PollFailure::Unplugged => DeviceError::Unplugged(device.to_string()),
            PollFailure::Other(reason) => DeviceError::poll_failed(device, reason),
        }
    }
}

/// An opened device.
pub trait DeviceHandle: Send {
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Read the device's current state.
    fn poll(&mut self) -> Result<Snapshot, PollFailure>;

    /// Release the device. Must be safe to call more than once.
    fn close(&mut self);
}

#[async_trait]
pub trait InputSource: Send + Sync {
    /// Attached devices in discovery order.
    async fn enumerate(&self) -> InputSourceResult<Vec<DeviceDescriptor>>;

    async fn open(&self, instance_guid: &str) -> Result<Box<dyn DeviceHandle>, OpenFailure>;
}

/// Owns an opened handle and closes it exactly once when dropped.
pub struct OpenDevice {
    handle: Box<dyn DeviceHandle>,
}

impl OpenDevice {
    pub fn new(handle: Box<dyn DeviceHandle>) -> Self {
        Self { handle }
    }

    /// Open `instance_guid` through `source` and wrap the handle.
    pub async fn open(
        source: &dyn InputSource,
        instance_guid: &str,
    ) -> Result<Self, OpenFailure> {
        source.open(instance_guid).await.map(Self::new)
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        self.handle.descriptor()
    }

    pub fn poll(&mut self) -> Result<Snapshot, PollFailure> {
        self.handle.poll()
    }
}

impl Drop for OpenDevice {
    fn drop(&mut self) {
        tracing::trace!(device = %self.handle.descriptor().instance_guid, "Closing device");
        self.handle.close();
    }
}

impl std::fmt::Debug for OpenDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDevice")
            .field("device", self.handle.descriptor())
            .finish()
    }
}
