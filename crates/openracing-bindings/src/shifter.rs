//! H-shifter gear table

use serde::{Deserialize, Serialize};

use crate::{GEAR_COUNT, Gear};

/// Button per gear gate, sharing one controller and one active flag.
///
/// The table is only ever active while at least one gear has a button.
/// Clearing the last assigned gear deactivates it and forgets its
/// controller. [`ShifterTable::assign`] re-activates it; setting a button
/// with [`ShifterTable::set_gear_button`] does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShifterTable {
    active: bool,
    pub controller: Option<usize>,
    gears: [Option<usize>; GEAR_COUNT],
}

impl ShifterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gear_button(&self, gear: Gear) -> Option<usize> {
        self.gears.get(gear.slot()).copied().flatten()
    }

    /// Bind `gear` to `button` on `controller` and activate the shifter.
    /// The controller is shared, so this moves every gear to it.
    pub fn assign(&mut self, gear: Gear, controller: usize, button: usize) {
        self.set_gear_button(gear, Some(button));
        self.activate(Some(controller));
    }

    /// Set or clear one gear. Setting a button leaves the active flag and
    /// controller alone; clearing the last one deactivates the table.
    pub fn set_gear_button(&mut self, gear: Gear, button: Option<usize>) {
        if let Some(slot) = self.gears.get_mut(gear.slot()) {
            *slot = button;
        }
        if !self.any_assigned() {
            self.active = false;
            self.controller = None;
        }
    }

    /// Activate on `controller`. Does nothing and returns false while no gear
    /// has a button.
    pub fn activate(&mut self, controller: Option<usize>) -> bool {
        if !self.any_assigned() {
            return false;
        }
        self.active = true;
        self.controller = controller;
        true
    }

    /// Clear one gear; returns true if it was assigned.
    pub fn clear_gear(&mut self, gear: Gear) -> bool {
        let was_assigned = self.gear_button(gear).is_some();
        self.set_gear_button(gear, None);
        was_assigned
    }

    /// Clear every gear and deactivate.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn any_assigned(&self) -> bool {
        self.gears.iter().any(Option::is_some)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Assigned gears in gate order.
    pub fn assigned(&self) -> impl Iterator<Item = (Gear, usize)> + '_ {
        Gear::ALL
            .into_iter()
            .filter_map(|gear| self.gear_button(gear).map(|button| (gear, button)))
    }

    /// Controller used by the gear, when the gear has a button and the table
    /// has a controller.
    pub fn gear_controller(&self, gear: Gear) -> Option<usize> {
        self.gear_button(gear).and(self.controller)
    }
}
