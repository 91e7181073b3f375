//! Binding entries
//!
//! An entry is bound only when both its controller and its axis or button are
//! set. Entries are never created or destroyed after startup; binds and
//! unbinds mutate them in place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::KeyCode;

/// Internal, 0-based axis slot.
///
/// Callers and summaries count axes from 1; convert with
/// [`AxisIndex::from_one_based`] and [`AxisIndex::one_based`] at every
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisIndex(usize);

impl AxisIndex {
    pub const fn new(zero_based: usize) -> Self {
        Self(zero_based)
    }

    /// `None` for 0, which is not a valid 1-based axis number.
    pub fn from_one_based(number: usize) -> Option<Self> {
        number.checked_sub(1).map(Self)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn one_based(self) -> usize {
        self.0.saturating_add(1)
    }
}

impl fmt::Display for AxisIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Axis {}", self.one_based())
    }
}

/// Pedal-style tuning: the used travel as percentages `0..=100`.
///
/// `from > to` means the axis is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTuning {
    pub from: u8,
    pub to: u8,
}

impl Default for RangeTuning {
    fn default() -> Self {
        Self { from: 0, to: 100 }
    }
}

impl RangeTuning {
    pub fn new(from: u8, to: u8) -> Self {
        Self {
            from: from.min(100),
            to: to.min(100),
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }

    /// `from` as the simulator's signed `MIN` value.
    pub fn min_value(&self) -> f64 {
        percent_to_signed(self.from)
    }

    /// `to` as the simulator's signed `MAX` value.
    pub fn max_value(&self) -> f64 {
        percent_to_signed(self.to)
    }

    /// Build from the simulator's signed `MIN`/`MAX` pair.
    pub fn from_signed(min: f64, max: f64) -> Self {
        Self {
            from: signed_to_percent(min),
            to: signed_to_percent(max),
        }
    }
}

/// `percent * 0.02 - 1.0`
pub fn percent_to_signed(percent: u8) -> f64 {
    f64::from(percent) * 0.02 - 1.0
}

/// Inverse of [`percent_to_signed`], rounded and clamped to `0..=100`.
pub fn signed_to_percent(value: f64) -> u8 {
    whole_percent(((value + 1.0) / 0.02).round())
}

/// Steering tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationTuning {
    pub degrees_of_rotation: u32,
    /// Percent of full scale, `0..=100`.
    pub scale: u8,
    pub invert: bool,
    /// Percent, stored ×100 relative to the file value.
    pub filter: u8,
    /// Percent, stored ×100 relative to the file value.
    pub speed_sensitivity: u8,
    pub ff_gain: f64,
    pub ff_filter: f64,
    pub debouncing_ms: u32,
}

impl Default for RotationTuning {
    fn default() -> Self {
        Self {
            degrees_of_rotation: 900,
            scale: 100,
            invert: false,
            filter: 0,
            speed_sensitivity: 0,
            ff_gain: 1.0,
            ff_filter: 0.0,
            debouncing_ms: 0,
        }
    }
}

impl RotationTuning {
    /// Signed `SCALE` value: negative when inverted.
    pub fn signed_scale(&self) -> f64 {
        let scale = f64::from(self.scale) / 100.0;
        if self.invert { -scale } else { scale }
    }

    pub fn set_signed_scale(&mut self, value: f64) {
        self.invert = value < 0.0;
        self.scale = fraction_to_percent(value.abs());
    }
}

/// `0.0..=1.0` to a clamped whole percentage.
pub fn fraction_to_percent(value: f64) -> u8 {
    whole_percent((value * 100.0).round())
}

/// Clamp a rounded percentage into `0..=100`; NaN maps to 0.
fn whole_percent(rounded: f64) -> u8 {
    if rounded.is_nan() {
        return 0;
    }
    (0..=100u8)
        .find(|p| f64::from(*p) >= rounded)
        .unwrap_or(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AxisTuning {
    Range(RangeTuning),
    Rotation(RotationTuning),
}

/// An action bound to an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisEntry {
    pub controller: Option<usize>,
    pub axis: Option<AxisIndex>,
    pub tuning: AxisTuning,
    /// Keyboard key written next to the axis (handbrake only).
    #[serde(default)]
    pub fallback_key: Option<KeyCode>,
}

impl AxisEntry {
    pub fn range() -> Self {
        Self {
            controller: None,
            axis: None,
            tuning: AxisTuning::Range(RangeTuning::default()),
            fallback_key: None,
        }
    }

    pub fn rotation() -> Self {
        Self {
            tuning: AxisTuning::Rotation(RotationTuning::default()),
            ..Self::range()
        }
    }

    pub fn with_fallback_key(mut self, key: KeyCode) -> Self {
        self.fallback_key = Some(key);
        self
    }

    /// Controller and axis, when both are set.
    pub fn binding(&self) -> Option<(usize, AxisIndex)> {
        self.controller.zip(self.axis)
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    pub fn assign(&mut self, controller: usize, axis: AxisIndex) {
        self.controller = Some(controller);
        self.axis = Some(axis);
    }

    /// Clear the assignment. Tuning and fallback key are kept.
    pub fn clear(&mut self) {
        self.controller = None;
        self.axis = None;
    }

    pub fn range_tuning(&self) -> Option<&RangeTuning> {
        match &self.tuning {
            AxisTuning::Range(range) => Some(range),
            AxisTuning::Rotation(_) => None,
        }
    }

    pub fn rotation_tuning(&self) -> Option<&RotationTuning> {
        match &self.tuning {
            AxisTuning::Rotation(rotation) => Some(rotation),
            AxisTuning::Range(_) => None,
        }
    }
}

/// An action bound to a button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEntry {
    pub controller: Option<usize>,
    pub button: Option<usize>,
    #[serde(default)]
    pub fallback_key: Option<KeyCode>,
}

impl ButtonEntry {
    pub fn with_key(key: KeyCode) -> Self {
        Self {
            fallback_key: Some(key),
            ..Self::default()
        }
    }

    pub fn binding(&self) -> Option<(usize, usize)> {
        self.controller.zip(self.button)
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    pub fn assign(&mut self, controller: usize, button: usize) {
        self.controller = Some(controller);
        self.button = Some(button);
    }

    /// Clear the assignment. The fallback key is kept.
    pub fn clear(&mut self) {
        self.controller = None;
        self.button = None;
    }
}
