//! Detection session records

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use openracing_bindings::{Action, BoundInput, InputKind};
use openracing_errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NO_SESSION_MESSAGE: &str = "No active detection session";

/// Devices a scan listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceScope {
    /// Position in the current enumeration.
    Device(usize),
    All,
}

impl fmt::Display for DeviceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceScope::Device(index) => write!(f, "device {index}"),
            DeviceScope::All => f.write_str("all devices"),
        }
    }
}

impl FromStr for DeviceScope {
    type Err = ConfigurationError;

    /// `all`, or a non-negative device index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(DeviceScope::All);
        }
        let index: i64 = value
            .parse()
            .map_err(|e| ConfigurationError::invalid_setting("device", format!("{value}: {e}")))?;
        usize::try_from(index)
            .ok()
            .map(DeviceScope::Device)
            .ok_or_else(|| ConfigurationError::bad_index("device", index))
    }
}

/// What a successful scan found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Discovery index of the device.
    pub controller: usize,
    pub controller_name: String,
    pub input: BoundInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Detected(Detection),
    TimedOut,
    Cancelled,
    Failed(String),
}

/// Externally visible state of one detection session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub session_id: Option<Uuid>,
    pub action: String,
    pub device_scope: Option<DeviceScope>,
    pub is_listening: bool,
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub success: bool,
    pub status_message: String,
    /// 1-based.
    pub detected_axis: Option<usize>,
    pub detected_button: Option<usize>,
    pub detected_controller_index: Option<usize>,
    pub detected_controller_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub timeout_ms: u64,
}

/// `15s` for whole seconds, `1500ms` otherwise.
pub(crate) fn format_timeout(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

fn whole_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl SessionStatus {
    pub(crate) fn listening(
        session_id: Uuid,
        action: Action,
        scope: DeviceScope,
        timeout: Duration,
    ) -> Self {
        let prompt = match action.input_kind() {
            InputKind::Axis => "Move the control",
            InputKind::Button => "Press and release the button",
        };
        Self {
            session_id: Some(session_id),
            action: action.name().to_string(),
            device_scope: Some(scope),
            is_listening: true,
            is_completed: false,
            is_cancelled: false,
            success: false,
            status_message: format!("{prompt} for {action} ({scope})"),
            detected_axis: None,
            detected_button: None,
            detected_controller_index: None,
            detected_controller_name: None,
            started_at: Some(Utc::now()),
            timeout_ms: whole_millis(timeout),
        }
    }

    /// Status reported for an action that never had a session.
    pub fn none(action: Action) -> Self {
        Self {
            session_id: None,
            action: action.name().to_string(),
            device_scope: None,
            is_listening: false,
            is_completed: false,
            is_cancelled: false,
            success: false,
            status_message: NO_SESSION_MESSAGE.to_string(),
            detected_axis: None,
            detected_button: None,
            detected_controller_index: None,
            detected_controller_name: None,
            started_at: None,
            timeout_ms: 0,
        }
    }

    /// Listening and not yet in a terminal state.
    pub fn is_active(&self) -> bool {
        self.is_listening && !self.is_completed && !self.is_cancelled
    }

    pub(crate) fn complete_success(&mut self, detection: &Detection) {
        self.is_listening = false;
        self.is_completed = true;
        self.success = true;
        match detection.input {
            BoundInput::Axis(axis) => self.detected_axis = Some(axis.one_based()),
            BoundInput::Button(button) => self.detected_button = Some(button),
        }
        self.detected_controller_index = Some(detection.controller);
        self.detected_controller_name = Some(detection.controller_name.clone());
        self.status_message = format!("{} detected and bound", self.action);
    }

    pub(crate) fn complete_failure(&mut self, message: impl Into<String>) {
        self.is_listening = false;
        self.is_completed = true;
        self.success = false;
        self.status_message = message.into();
    }

    pub(crate) fn cancel(&mut self) {
        self.is_listening = false;
        self.is_cancelled = true;
        self.status_message = format!("Detection for {} cancelled", self.action);
    }
}
