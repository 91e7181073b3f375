//! Action and gear names

use std::fmt;
use std::str::FromStr;

use openracing_errors::ConfigurationError;
use serde::{Deserialize, Serialize};

pub const GEAR_COUNT: usize = 8;

/// One H-shifter gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gear {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Reverse,
}

impl Gear {
    pub const ALL: [Gear; GEAR_COUNT] = [
        Gear::First,
        Gear::Second,
        Gear::Third,
        Gear::Fourth,
        Gear::Fifth,
        Gear::Sixth,
        Gear::Seventh,
        Gear::Reverse,
    ];

    /// Section and key name, `GEAR_1`..`GEAR_7`, `GEAR_R`.
    pub fn name(self) -> &'static str {
        match self {
            Gear::First => "GEAR_1",
            Gear::Second => "GEAR_2",
            Gear::Third => "GEAR_3",
            Gear::Fourth => "GEAR_4",
            Gear::Fifth => "GEAR_5",
            Gear::Sixth => "GEAR_6",
            Gear::Seventh => "GEAR_7",
            Gear::Reverse => "GEAR_R",
        }
    }

    /// Position in [`Gear::ALL`].
    pub fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gear {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Gear::ALL
            .into_iter()
            .find(|gear| gear.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::InvalidGear(wanted.to_string()))
    }
}

/// Which kind of physical input an action binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Axis,
    Button,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Axis => f.write_str("axis"),
            InputKind::Button => f.write_str("button"),
        }
    }
}

/// A named logical control a binding is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Steer,
    Throttle,
    Brakes,
    Clutch,
    Handbrake,
    GearUp,
    GearDown,
    PaddleUp,
    PaddleDown,
    Camera,
    Gear(Gear),
}

impl Action {
    pub const ENTRIES: [Action; 10] = [
        Action::Steer,
        Action::Throttle,
        Action::Brakes,
        Action::Clutch,
        Action::Handbrake,
        Action::GearUp,
        Action::GearDown,
        Action::PaddleUp,
        Action::PaddleDown,
        Action::Camera,
    ];

    /// Every action, entries first, then the eight gears.
    pub fn all() -> impl Iterator<Item = Action> {
        Self::ENTRIES
            .into_iter()
            .chain(Gear::ALL.into_iter().map(Action::Gear))
    }

    /// Name used by callers (`CAMERA` rather than its storage key).
    pub fn name(self) -> &'static str {
        match self {
            Action::Steer => "STEER",
            Action::Throttle => "THROTTLE",
            Action::Brakes => "BRAKES",
            Action::Clutch => "CLUTCH",
            Action::Handbrake => "HANDBRAKE",
            Action::GearUp => "GEARUP",
            Action::GearDown => "GEARDN",
            Action::PaddleUp => "PADDLEUP",
            Action::PaddleDown => "PADDLEDN",
            Action::Camera => "CAMERA",
            Action::Gear(gear) => gear.name(),
        }
    }

    /// Section the action is stored under in the controls file.
    pub fn storage_key(self) -> &'static str {
        match self {
            Action::Camera => "ACTION_CHANGE_CAMERA",
            other => other.name(),
        }
    }

    pub fn input_kind(self) -> InputKind {
        match self {
            Action::Steer
            | Action::Throttle
            | Action::Brakes
            | Action::Clutch
            | Action::Handbrake => InputKind::Axis,
            _ => InputKind::Button,
        }
    }

    pub fn gear(self) -> Option<Gear> {
        match self {
            Action::Gear(gear) => Some(gear),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::Steer => "Steering wheel",
            Action::Throttle => "Throttle pedal",
            Action::Brakes => "Brake pedal",
            Action::Clutch => "Clutch pedal",
            Action::Handbrake => "Handbrake",
            Action::GearUp => "Gear up",
            Action::GearDown => "Gear down",
            Action::PaddleUp => "Paddle up",
            Action::PaddleDown => "Paddle down",
            Action::Camera => "Change camera",
            Action::Gear(_) => "H-Shifter gear",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Some(action) = Self::ENTRIES
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted) || a.storage_key().eq_ignore_ascii_case(wanted))
        {
            return Ok(action);
        }

        let looks_like_gear = wanted
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("GEAR_"));
        if looks_like_gear {
            return wanted.parse().map(Action::Gear);
        }

        Err(ConfigurationError::unknown_action(wanted))
    }
}

/// What an unbind request may name: an action, or the whole shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbindTarget {
    Action(Action),
    Shifter,
}

impl FromStr for UnbindTarget {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("SHIFTER") || wanted.eq_ignore_ascii_case("H_SHIFTER") {
            return Ok(UnbindTarget::Shifter);
        }
        wanted.parse().map(UnbindTarget::Action)
    }
}
