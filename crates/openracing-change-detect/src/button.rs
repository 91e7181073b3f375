//! Button press detection
//!
//! A press is only reported after it survives a confirmation re-poll and the
//! button has been released again:
//!
//! ```text
//! Idle --(unpressed -> pressed)--> Candidate --(still pressed)--> Held --(released)--> Released
//!   ^                                  |
//!   +----------(no longer pressed)-----+
//! ```

use std::time::Duration;

use crate::DetectionTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonPhase {
    /// Waiting for a button to go down.
    #[default]
    Idle,
    /// A button went down; re-poll after the confirm delay.
    Candidate(usize),
    /// The press was confirmed; waiting for release.
    Held(usize),
    /// Confirmed press followed by release. Terminal.
    Released(usize),
}

impl ButtonPhase {
    /// Button this phase is about, if any.
    pub fn button(&self) -> Option<usize> {
        match *self {
            ButtonPhase::Idle => None,
            ButtonPhase::Candidate(b) | ButtonPhase::Held(b) | ButtonPhase::Released(b) => Some(b),
        }
    }

    /// Button whose press has been confirmed, released or not.
    pub fn confirmed(&self) -> Option<usize> {
        match *self {
            ButtonPhase::Held(b) | ButtonPhase::Released(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, ButtonPhase::Released(_))
    }

    /// True while a particular button has the detector's attention.
    pub fn is_engaged(&self) -> bool {
        matches!(self, ButtonPhase::Candidate(_) | ButtonPhase::Held(_))
    }

    /// How long the driver should wait before the next poll.
    pub fn next_delay(&self, timing: &DetectionTiming) -> Duration {
        match self {
            ButtonPhase::Idle => timing.tick_interval,
            ButtonPhase::Candidate(_) => timing.confirm_delay,
            ButtonPhase::Held(_) => timing.release_poll,
            ButtonPhase::Released(_) => Duration::ZERO,
        }
    }
}

/// Press/confirm/release state machine for one device.
#[derive(Debug, Clone, Default)]
pub struct ButtonPressDetector {
    previous: Option<Vec<bool>>,
    phase: ButtonPhase,
}

impl ButtonPressDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ButtonPhase {
        self.phase
    }

    /// Feed one poll of the device's buttons and return the new phase.
    pub fn observe(&mut self, buttons: &[bool]) -> ButtonPhase {
        let pressed = |index: usize| buttons.get(index).copied().unwrap_or(false);

        self.phase = match self.phase {
            ButtonPhase::Idle => self
                .previous
                .as_ref()
                .and_then(|previous| first_new_press(previous, buttons))
                .map_or(ButtonPhase::Idle, ButtonPhase::Candidate),
            ButtonPhase::Candidate(b) if pressed(b) => ButtonPhase::Held(b),
            ButtonPhase::Candidate(_) => ButtonPhase::Idle,
            ButtonPhase::Held(b) if pressed(b) => ButtonPhase::Held(b),
            ButtonPhase::Held(b) => ButtonPhase::Released(b),
            released @ ButtonPhase::Released(_) => released,
        };

        self.previous = Some(buttons.to_vec());
        self.phase
    }
}

/// Lowest button that is pressed now but was not pressed before.
fn first_new_press(previous: &[bool], current: &[bool]) -> Option<usize> {
    current.iter().enumerate().find_map(|(index, &now)| {
        let before = previous.get(index).copied().unwrap_or(false);
        (now && !before).then_some(index)
    })
}
