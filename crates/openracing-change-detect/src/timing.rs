//! Detection delays and thresholds

use std::time::Duration;

use openracing_errors::ConfigurationError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_DEVICE_SETTLE: Duration = Duration::from_millis(50);
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_RELEASE_POLL: Duration = Duration::from_millis(200);

/// Tick-to-tick change that counts as movement on a single device.
pub const DEFAULT_AXIS_EPSILON: f64 = 0.001;
/// Change from baseline that makes an axis a candidate in an all-devices scan.
pub const DEFAULT_CANDIDATE_THRESHOLD: f64 = 0.05;
/// Change from baseline that ends an all-devices scan immediately.
pub const DEFAULT_COMMIT_THRESHOLD: f64 = 0.1;

/// Every delay and threshold a detection scan uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionTiming {
    pub default_timeout: Duration,
    /// Sleep between poll ticks while nothing is happening.
    pub tick_interval: Duration,
    /// Wait after opening a single device before taking its baseline.
    pub settle_delay: Duration,
    /// Wait after opening each device of an all-devices scan.
    pub device_settle: Duration,
    /// Wait before re-polling a candidate button press.
    pub confirm_delay: Duration,
    /// Wait between release checks of a confirmed press.
    pub release_poll: Duration,
    pub axis_epsilon: f64,
    pub candidate_threshold: f64,
    pub commit_threshold: f64,
}

impl Default for DetectionTiming {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            device_settle: DEFAULT_DEVICE_SETTLE,
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            release_poll: DEFAULT_RELEASE_POLL,
            axis_epsilon: DEFAULT_AXIS_EPSILON,
            candidate_threshold: DEFAULT_CANDIDATE_THRESHOLD,
            commit_threshold: DEFAULT_COMMIT_THRESHOLD,
        }
    }
}

impl DetectionTiming {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let delays = [
            ("default_timeout", self.default_timeout),
            ("tick_interval", self.tick_interval),
            ("confirm_delay", self.confirm_delay),
            ("release_poll", self.release_poll),
        ];
        for (field, delay) in delays {
            if delay.is_zero() {
                return Err(ConfigurationError::invalid_setting(field, "must be greater than zero"));
            }
        }

        let thresholds = [
            ("axis_epsilon", self.axis_epsilon),
            ("candidate_threshold", self.candidate_threshold),
            ("commit_threshold", self.commit_threshold),
        ];
        for (field, value) in thresholds {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigurationError::invalid_setting(
                    field,
                    format!("{value} is outside (0, 1)"),
                ));
            }
        }

        if self.candidate_threshold > self.commit_threshold {
            return Err(ConfigurationError::invalid_setting(
                "candidate_threshold",
                "must not exceed commit_threshold",
            ));
        }
        Ok(())
    }
}
