//! Scripted input source
//!
//! Replays per-device frame lists. Each poll of a handle consumes the next
//! frame; once the list is exhausted the last frame repeats, which reads like
//! a user letting go of the controls. A device can be told to refuse opening
//! or to unplug after a number of polls.
//!
//! Capture files are JSON:
//!
//! ```json
//! { "devices": [
//!     { "descriptor": { "instance_guid": "{A}", "product_guid": "{P}", "name": "Wheel" },
//!       "frames": [ { "axes": [0.5, 0.0], "buttons": [false] } ] }
//! ] }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    DeviceDescriptor, DeviceHandle, InputSource, InputSourceResult, OpenFailure, PollFailure,
    Snapshot,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedDevice {
    pub descriptor: DeviceDescriptor,
    #[serde(default)]
    pub frames: Vec<Snapshot>,
    #[serde(default)]
    pub fail_open: bool,
    /// Polls that succeed before the device reports [`PollFailure::Unplugged`].
    #[serde(default)]
    pub unplug_after: Option<usize>,
}

impl ScriptedDevice {
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            descriptor,
            frames: Vec::new(),
            fail_open: false,
            unplug_after: None,
        }
    }

    pub fn with_frames(mut self, frames: Vec<Snapshot>) -> Self {
        self.frames = frames;
        self
    }

    /// Frames built from axis values only.
    pub fn with_axis_frames(self, frames: Vec<Vec<f64>>) -> Self {
        self.with_frames(
            frames
                .into_iter()
                .map(|axes| Snapshot::new(axes, Vec::new()))
                .collect(),
        )
    }

    /// Frames built from button states only.
    pub fn with_button_frames(self, frames: Vec<Vec<bool>>) -> Self {
        self.with_frames(
            frames
                .into_iter()
                .map(|buttons| Snapshot::new(Vec::new(), buttons))
                .collect(),
        )
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn unplugging_after(mut self, polls: usize) -> Self {
        self.unplug_after = Some(polls);
        self
    }
}

/// Open/close bookkeeping shared by a source and every handle it issued.
#[derive(Debug, Default)]
pub struct HandleCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl HandleCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn open_handles(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

#[derive(Debug, Deserialize)]
struct CaptureFile {
    devices: Vec<ScriptedDevice>,
}

pub struct ScriptedSource {
    devices: Vec<ScriptedDevice>,
    counters: Arc<HandleCounters>,
}

impl ScriptedSource {
    pub fn new(devices: Vec<ScriptedDevice>) -> Self {
        Self {
            devices,
            counters: Arc::new(HandleCounters::default()),
        }
    }

    pub fn from_capture_json(json: &str) -> InputSourceResult<Self> {
        let capture: CaptureFile = serde_json::from_str(json)?;
        Ok(Self::new(capture.devices))
    }

    pub fn load(path: &Path) -> InputSourceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_capture_json(&content)
    }

    pub fn counters(&self) -> Arc<HandleCounters> {
        Arc::clone(&self.counters)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[async_trait]
impl InputSource for ScriptedSource {
    async fn enumerate(&self) -> InputSourceResult<Vec<DeviceDescriptor>> {
        Ok(self.devices.iter().map(|d| d.descriptor.clone()).collect())
    }

    async fn open(&self, instance_guid: &str) -> Result<Box<dyn DeviceHandle>, OpenFailure> {
        let device = self
            .devices
            .iter()
            .find(|d| d.descriptor.instance_guid == instance_guid)
            .ok_or_else(|| OpenFailure::new(instance_guid, "no such device"))?;

        if device.fail_open {
            return Err(OpenFailure::new(
                device.descriptor.name.clone(),
                "device refused to open",
            ));
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        debug!(device = %device.descriptor.name, "Opened scripted device");

        Ok(Box::new(ScriptedHandle {
            descriptor: device.descriptor.clone(),
            frames: device.frames.clone(),
            cursor: 0,
            unplug_after: device.unplug_after,
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

struct ScriptedHandle {
    descriptor: DeviceDescriptor,
    frames: Vec<Snapshot>,
    cursor: usize,
    unplug_after: Option<usize>,
    counters: Arc<HandleCounters>,
    closed: bool,
}

impl DeviceHandle for ScriptedHandle {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn poll(&mut self) -> Result<Snapshot, PollFailure> {
        if self.closed {
            return Err(PollFailure::Other("handle already closed".to_string()));
        }
        if self.unplug_after.is_some_and(|limit| self.cursor >= limit) {
            return Err(PollFailure::Unplugged);
        }

        let frame = self
            .frames
            .get(self.cursor)
            .or_else(|| self.frames.last())
            .cloned()
            .unwrap_or_default();
        self.cursor = self.cursor.saturating_add(1);
        Ok(frame)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> DeviceDescriptor {
        DeviceDescriptor::new("{W1}", "Wheel").with_product_guid("{P1}")
    }

    #[tokio::test]
    async fn test_frames_then_last_frame_repeats() -> Result<(), Box<dyn std::error::Error>> {
        let source = ScriptedSource::new(vec![
            ScriptedDevice::new(wheel()).with_axis_frames(vec![vec![0.1], vec![0.2]]),
        ]);
        let mut handle = source.open("{W1}").await?;

        let values: Vec<Option<f64>> = (0..4)
            .map(|_| handle.poll().map(|s| s.axis(0)))
            .collect::<Result<_, _>>()?;
        assert_eq!(values.len(), 4);
        assert!(values.iter().skip(1).all(|v| v.is_some_and(|x| (x - 0.2).abs() < 1e-9)));
        handle.close();
        Ok(())
    }

    #[tokio::test]
    async fn test_unplug_after() -> Result<(), Box<dyn std::error::Error>> {
        let source = ScriptedSource::new(vec![
            ScriptedDevice::new(wheel())
                .with_button_frames(vec![vec![false]])
                .unplugging_after(2),
        ]);
        let mut handle = source.open("{W1}").await?;
        assert!(handle.poll().is_ok());
        assert!(handle.poll().is_ok());
        assert_eq!(handle.poll(), Err(PollFailure::Unplugged));
        Ok(())
    }

    #[tokio::test]
    async fn test_fail_open_does_not_count() {
        let source = ScriptedSource::new(vec![ScriptedDevice::new(wheel()).failing_open()]);
        assert!(source.open("{W1}").await.is_err());
        assert_eq!(source.counters().opened(), 0);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let source = ScriptedSource::new(vec![ScriptedDevice::new(wheel())]);
        let counters = source.counters();
        let mut handle = source.open("{W1}").await?;
        handle.close();
        handle.close();
        assert_eq!(counters.closed(), 1);
        assert!(handle.poll().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_capture_round_trip_enumerates_in_order() -> Result<(), Box<dyn std::error::Error>>
    {
        let json = r#"{ "devices": [
            { "descriptor": { "instance_guid": "{B}", "name": "Pedals" } },
            { "descriptor": { "instance_guid": "{A}", "product_guid": "{PA}", "name": "Wheel" },
              "frames": [ { "axes": [0.5], "buttons": [false, true], "povs": [-1] } ] }
        ] }"#;
        let source = ScriptedSource::from_capture_json(json)?;
        let devices = source.enumerate().await?;
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Pedals", "Wheel"]);
        assert_eq!(devices.get(1).map(|d| d.product_guid.as_str()), Some("{PA}"));
        Ok(())
    }
}
