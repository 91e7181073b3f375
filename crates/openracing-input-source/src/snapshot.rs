//! Polled device state

use serde::{Deserialize, Serialize};

/// Most axes a joystick-class device exposes.
pub const MAX_AXES: usize = 8;

/// POV value meaning "centered".
pub const POV_CENTERED: i32 = -1;

const AXIS_NAMES: [&str; MAX_AXES] = ["X", "Y", "Z", "RX", "RY", "RZ", "Slider0", "Slider1"];

/// One poll tick of a device.
///
/// Axis values are normalized to `0.0..=1.0`; POV directions are
/// [`POV_CENTERED`] or degrees multiplied by 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub axes: Vec<f64>,
    #[serde(default)]
    pub buttons: Vec<bool>,
    #[serde(default)]
    pub povs: Vec<i32>,
}

impl Snapshot {
    pub fn new(axes: Vec<f64>, buttons: Vec<bool>) -> Self {
        Self {
            axes,
            buttons,
            povs: Vec::new(),
        }
    }

    pub fn with_povs(mut self, povs: Vec<i32>) -> Self {
        self.povs = povs;
        self
    }

    /// Build a snapshot from raw 16-bit axis readings.
    pub fn from_raw_axes(raw: &[u16], buttons: Vec<bool>) -> Self {
        Self::new(raw.iter().copied().map(normalize_axis).collect(), buttons)
    }

    pub fn axis(&self, index: usize) -> Option<f64> {
        self.axes.get(index).copied()
    }

    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    pub fn pressed_buttons(&self) -> impl Iterator<Item = usize> + '_ {
        self.buttons
            .iter()
            .enumerate()
            .filter_map(|(index, pressed)| pressed.then_some(index))
    }

    /// First POV that is not centered, as (pov index, direction).
    pub fn active_pov(&self) -> Option<(usize, i32)> {
        self.povs
            .iter()
            .copied()
            .enumerate()
            .find(|(_, direction)| *direction != POV_CENTERED)
    }
}

/// Normalize a raw 16-bit axis reading to `0.0..=1.0`.
pub fn normalize_axis(raw: u16) -> f64 {
    f64::from(raw) / f64::from(u16::MAX)
}

/// Conventional name of an axis slot (`X`, `RZ`, `Slider0`, ...).
pub fn axis_name(index: usize) -> Option<&'static str> {
    AXIS_NAMES.get(index).copied()
}
