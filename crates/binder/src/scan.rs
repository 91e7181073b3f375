//! Scan loops driving the change detectors
//!
//! A scan owns every device handle it opens. Handles are [`OpenDevice`]
//! guards, so returning from any point of a scan closes them.
//!
//! Each iteration checks the cancel flag first, then the deadline, then polls.
//! Worst-case cancel latency is one sleep.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use openracing_bindings::{AxisIndex, BoundInput, InputKind};
use openracing_change_detect::{
    AxisCandidate, AxisTracker, BaselineAxisTracker, ButtonPhase, ButtonPressDetector,
    DetectionTiming,
};
use openracing_errors::DeviceError;
use openracing_input_source::{DeviceDescriptor, InputSource, OpenDevice};
use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use crate::session::{Detection, ScanOutcome};

/// Devices one session scans, fixed when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    Single {
        index: usize,
        descriptor: DeviceDescriptor,
    },
    All(Vec<DeviceDescriptor>),
}

pub struct Scan {
    pub source: Arc<dyn InputSource>,
    pub timing: DetectionTiming,
    pub kind: InputKind,
    pub timeout: Duration,
    pub cancel: Arc<AtomicBool>,
}

impl Scan {
    pub async fn run(&self, target: ScanTarget) -> ScanOutcome {
        match target {
            ScanTarget::Single { index, descriptor } => self.single(index, &descriptor).await,
            ScanTarget::All(devices) => self.all(&devices).await,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    async fn single(&self, index: usize, descriptor: &DeviceDescriptor) -> ScanOutcome {
        let deadline = Instant::now() + self.timeout;
        let mut device = match OpenDevice::open(self.source.as_ref(), &descriptor.instance_guid).await
        {
            Ok(device) => device,
            Err(failure) => return ScanOutcome::Failed(DeviceError::from(failure).to_string()),
        };
        sleep(self.timing.settle_delay).await;

        let name = descriptor.display_name().to_string();
        let detected = |input| {
            ScanOutcome::Detected(Detection {
                controller: index,
                controller_name: name.clone(),
                input,
            })
        };

        let mut axes = AxisTracker::new(self.timing.axis_epsilon);
        let mut buttons = ButtonPressDetector::new();

        loop {
            if self.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            if Instant::now() >= deadline {
                // A press confirmed but not yet released still counts.
                return match buttons.phase().confirmed() {
                    Some(button) => detected(BoundInput::Button(button)),
                    None => ScanOutcome::TimedOut,
                };
            }

            let snapshot = match device.poll() {
                Ok(snapshot) => snapshot,
                Err(failure) => {
                    let err = failure.into_device_error(&name);
                    warn!(device = %name, error = %err, "Device lost during scan");
                    return ScanOutcome::Failed(err.to_string());
                }
            };

            let delay = match self.kind {
                InputKind::Axis => {
                    if let Some(movement) = axes.observe(&snapshot.axes) {
                        debug!(device = %name, axis = movement.axis, delta = movement.delta, "Axis moved");
                        return detected(BoundInput::Axis(AxisIndex::new(movement.axis)));
                    }
                    self.timing.tick_interval
                }
                InputKind::Button => {
                    let phase = buttons.observe(&snapshot.buttons);
                    if let ButtonPhase::Released(button) = phase {
                        return detected(BoundInput::Button(button));
                    }
                    phase.next_delay(&self.timing)
                }
            };
            sleep(delay).await;
        }
    }

    async fn all(&self, devices: &[DeviceDescriptor]) -> ScanOutcome {
        let deadline = Instant::now() + self.timeout;
        let mut pool = Vec::with_capacity(devices.len());

        for (index, descriptor) in devices.iter().enumerate() {
            if self.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            match OpenDevice::open(self.source.as_ref(), &descriptor.instance_guid).await {
                Ok(device) => {
                    sleep(self.timing.device_settle).await;
                    if let Some(scanned) = PooledDevice::start(index, device, &self.timing) {
                        pool.push(scanned);
                    }
                }
                Err(failure) => {
                    warn!(device = %descriptor.display_name(), error = %failure, "Skipping device");
                }
            }
        }

        if pool.is_empty() {
            return ScanOutcome::Failed("No input device could be opened".to_string());
        }
        debug!(devices = pool.len(), "Scanning all devices");

        let mut candidate = AxisCandidate::default();

        loop {
            if self.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            if Instant::now() >= deadline {
                return self.best_at_timeout(&pool, &candidate);
            }

            let mut delay = self.timing.tick_interval;
            let mut lost = Vec::new();

            for scanned in &mut pool {
                let snapshot = match scanned.device.poll() {
                    Ok(snapshot) => snapshot,
                    Err(failure) => {
                        let err = failure.into_device_error(&scanned.name);
                        warn!(device = %scanned.name, error = %err, "Dropping device from scan");
                        candidate.forget_device(scanned.index);
                        lost.push(scanned.index);
                        continue;
                    }
                };

                match self.kind {
                    InputKind::Axis => {
                        if let Some(movement) = scanned.baseline.observe(&snapshot.axes)
                            && candidate.offer(scanned.index, movement)
                        {
                            trace!(device = %scanned.name, axis = movement.axis, delta = movement.delta, "New axis candidate");
                        }
                    }
                    InputKind::Button => {
                        let phase = scanned.buttons.observe(&snapshot.buttons);
                        if let ButtonPhase::Released(button) = phase {
                            return scanned.detected(BoundInput::Button(button));
                        }
                        delay = delay.max(phase.next_delay(&self.timing));
                    }
                }
            }

            if !lost.is_empty() {
                pool.retain(|scanned| !lost.contains(&scanned.index));
                if pool.is_empty() {
                    return ScanOutcome::Failed("All devices were disconnected".to_string());
                }
            }

            if candidate.is_committed(self.timing.commit_threshold)
                && let Some(outcome) = axis_outcome(&pool, &candidate)
            {
                return outcome;
            }

            sleep(delay).await;
        }
    }

    fn best_at_timeout(&self, pool: &[PooledDevice], candidate: &AxisCandidate) -> ScanOutcome {
        let outcome = match self.kind {
            InputKind::Axis => axis_outcome(pool, candidate),
            InputKind::Button => pool.iter().find_map(|scanned| {
                scanned
                    .buttons
                    .phase()
                    .confirmed()
                    .map(|button| scanned.detected(BoundInput::Button(button)))
            }),
        };
        outcome.unwrap_or(ScanOutcome::TimedOut)
    }
}

fn axis_outcome(pool: &[PooledDevice], candidate: &AxisCandidate) -> Option<ScanOutcome> {
    let (index, movement) = candidate.best()?;
    let scanned = pool.iter().find(|scanned| scanned.index == index)?;
    debug!(device = %scanned.name, axis = movement.axis, delta = movement.delta, "Axis selected");
    Some(scanned.detected(BoundInput::Axis(AxisIndex::new(movement.axis))))
}

/// One device in an all-devices scan.
struct PooledDevice {
    index: usize,
    name: String,
    device: OpenDevice,
    baseline: BaselineAxisTracker,
    buttons: ButtonPressDetector,
}

impl PooledDevice {
    /// Takes the session-start baseline. A device that cannot be polled
    /// here never joins the pool.
    fn start(index: usize, mut device: OpenDevice, timing: &DetectionTiming) -> Option<Self> {
        let name = device.descriptor().display_name().to_string();
        let first = match device.poll() {
            Ok(snapshot) => snapshot,
            Err(failure) => {
                warn!(device = %name, error = %failure, "Skipping device without baseline");
                return None;
            }
        };
        let mut buttons = ButtonPressDetector::new();
        buttons.observe(&first.buttons);
        Some(Self {
            index,
            name,
            baseline: BaselineAxisTracker::new(&first.axes, timing.candidate_threshold),
            buttons,
            device,
        })
    }

    fn detected(&self, input: BoundInput) -> ScanOutcome {
        ScanOutcome::Detected(Detection {
            controller: self.index,
            controller_name: self.name.clone(),
            input,
        })
    }
}
