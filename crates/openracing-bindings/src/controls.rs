//! The binding registry

use std::fmt;
use std::str::FromStr;

use openracing_errors::{ConfigurationError, ConflictError, DeviceError};
use openracing_input_source::DeviceDescriptor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Action, AxisEntry, AxisIndex, BindingsResult, ButtonEntry, CuratedDevice, DeviceList, Gear,
    KeyCode, ShifterTable, UnbindTarget,
};

/// `[HEADER] INPUT_METHOD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputMethod {
    Keyboard,
    #[default]
    Wheel,
    Gamepad,
}

impl InputMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            InputMethod::Keyboard => "KEYBOARD",
            InputMethod::Wheel => "WHEEL",
            InputMethod::Gamepad => "GAMEPAD",
        }
    }
}

impl fmt::Display for InputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMethod {
    type Err = ConfigurationError;

    /// Accepts the names and the legacy numeric form (`0`, `1`, `2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KEYBOARD" | "0" => Ok(InputMethod::Keyboard),
            "WHEEL" | "1" => Ok(InputMethod::Wheel),
            "GAMEPAD" | "2" => Ok(InputMethod::Gamepad),
            other => Err(ConfigurationError::invalid_setting("INPUT_METHOD", other)),
        }
    }
}

/// Borrowed view of one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryRef<'a> {
    Axis(&'a AxisEntry),
    Button(&'a ButtonEntry),
}

impl EntryRef<'_> {
    pub fn controller(&self) -> Option<usize> {
        match self {
            EntryRef::Axis(entry) => entry.controller,
            EntryRef::Button(entry) => entry.controller,
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            EntryRef::Axis(entry) => entry.is_bound(),
            EntryRef::Button(entry) => entry.is_bound(),
        }
    }
}

/// Every action's assignment, the H-shifter table and the curated device
/// list.
///
/// Entries exist for the whole lifetime of the value. Controller indices are
/// the indices devices had at discovery; see [`DeviceList::output_index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub input_method: InputMethod,
    pub steer: AxisEntry,
    pub throttle: AxisEntry,
    pub brakes: AxisEntry,
    pub clutch: AxisEntry,
    pub handbrake: AxisEntry,
    pub gear_up: ButtonEntry,
    pub gear_down: ButtonEntry,
    pub paddle_up: ButtonEntry,
    pub paddle_down: ButtonEntry,
    pub camera: ButtonEntry,
    pub shifter: ShifterTable,
    pub reset_race_key: Option<KeyCode>,
    pub devices: DeviceList,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    pub fn new() -> Self {
        Self {
            input_method: InputMethod::Wheel,
            steer: AxisEntry::rotation(),
            throttle: AxisEntry::range(),
            brakes: AxisEntry::range(),
            clutch: AxisEntry::range(),
            handbrake: AxisEntry::range().with_fallback_key(KeyCode::H),
            gear_up: ButtonEntry::with_key(KeyCode::W),
            gear_down: ButtonEntry::with_key(KeyCode::S),
            paddle_up: ButtonEntry::default(),
            paddle_down: ButtonEntry::default(),
            camera: ButtonEntry::with_key(KeyCode::C),
            shifter: ShifterTable::new(),
            reset_race_key: None,
            devices: DeviceList::new(),
        }
    }

    pub fn axis_entry(&self, action: Action) -> Option<&AxisEntry> {
        match action {
            Action::Steer => Some(&self.steer),
            Action::Throttle => Some(&self.throttle),
            Action::Brakes => Some(&self.brakes),
            Action::Clutch => Some(&self.clutch),
            Action::Handbrake => Some(&self.handbrake),
            _ => None,
        }
    }

    pub fn axis_entry_mut(&mut self, action: Action) -> Option<&mut AxisEntry> {
        match action {
            Action::Steer => Some(&mut self.steer),
            Action::Throttle => Some(&mut self.throttle),
            Action::Brakes => Some(&mut self.brakes),
            Action::Clutch => Some(&mut self.clutch),
            Action::Handbrake => Some(&mut self.handbrake),
            _ => None,
        }
    }

    /// Button entry for `action`. Gears live in [`Controls::shifter`] and
    /// have no entry.
    pub fn button_entry(&self, action: Action) -> Option<&ButtonEntry> {
        match action {
            Action::GearUp => Some(&self.gear_up),
            Action::GearDown => Some(&self.gear_down),
            Action::PaddleUp => Some(&self.paddle_up),
            Action::PaddleDown => Some(&self.paddle_down),
            Action::Camera => Some(&self.camera),
            _ => None,
        }
    }

    pub fn button_entry_mut(&mut self, action: Action) -> Option<&mut ButtonEntry> {
        match action {
            Action::GearUp => Some(&mut self.gear_up),
            Action::GearDown => Some(&mut self.gear_down),
            Action::PaddleUp => Some(&mut self.paddle_up),
            Action::PaddleDown => Some(&mut self.paddle_down),
            Action::Camera => Some(&mut self.camera),
            _ => None,
        }
    }

    pub fn entry(&self, action: Action) -> Option<EntryRef<'_>> {
        self.axis_entry(action)
            .map(EntryRef::Axis)
            .or_else(|| self.button_entry(action).map(EntryRef::Button))
    }

    /// Overwrite the axis assignment of `action`. Returns false when the
    /// action is not an axis. No check is made against other actions using
    /// the same physical axis.
    pub fn assign_axis(&mut self, action: Action, controller: usize, axis: AxisIndex) -> bool {
        let Some(entry) = self.axis_entry_mut(action) else {
            return false;
        };
        entry.assign(controller, axis);
        debug!(action = %action, controller, axis = axis.one_based(), "Axis assigned");
        true
    }

    /// Overwrite the button assignment of `action`. Gears go to the shifter
    /// table and activate it. Returns false when the action is an axis.
    pub fn assign_button(&mut self, action: Action, controller: usize, button: usize) -> bool {
        if let Some(gear) = action.gear() {
            self.assign_gear(gear, controller, button);
            return true;
        }
        let Some(entry) = self.button_entry_mut(action) else {
            return false;
        };
        entry.assign(controller, button);
        debug!(action = %action, controller, button, "Button assigned");
        true
    }

    /// Bind one gear and activate the shifter on `controller`.
    pub fn assign_gear(&mut self, gear: Gear, controller: usize, button: usize) {
        self.shifter.assign(gear, controller, button);
        debug!(gear = %gear, controller, button, "Gear assigned");
    }

    /// Set a gear's button without activating the shifter.
    pub fn set_gear_button(&mut self, gear: Gear, button: Option<usize>) {
        self.shifter.set_gear_button(gear, button);
    }

    /// Activate the shifter on `controller`. Returns false, leaving it
    /// inactive, while no gear has a button.
    pub fn activate_shifter(&mut self, controller: usize) -> bool {
        self.shifter.activate(Some(controller))
    }

    /// Clear one action, or the whole shifter. Returns true if anything was
    /// bound before.
    pub fn unbind(&mut self, target: UnbindTarget) -> bool {
        let was_bound = match target {
            UnbindTarget::Shifter => {
                let any = self.shifter.any_assigned();
                self.shifter.reset();
                any
            }
            UnbindTarget::Action(Action::Gear(gear)) => self.shifter.clear_gear(gear),
            UnbindTarget::Action(action) => {
                if let Some(entry) = self.axis_entry_mut(action) {
                    let bound = entry.is_bound();
                    entry.clear();
                    bound
                } else if let Some(entry) = self.button_entry_mut(action) {
                    let bound = entry.is_bound();
                    entry.clear();
                    bound
                } else {
                    false
                }
            }
        };
        debug!(?target, was_bound, "Unbound");
        was_bound
    }

    /// Clear every entry and the whole gear table.
    pub fn unbind_all(&mut self) {
        for action in Action::ENTRIES {
            self.unbind(UnbindTarget::Action(action));
        }
        self.shifter.reset();
        info!("All bindings cleared");
    }

    /// Unbind by the id a summary reports (`THROTTLE_1`, `CAMERA_1`,
    /// `GEAR_3`, `GEAR_R`).
    pub fn unbind_binding(&mut self, binding_id: &str) -> Result<Action, ConfigurationError> {
        let action = parse_binding_id(binding_id)?;
        self.unbind(UnbindTarget::Action(action));
        Ok(action)
    }

    /// Actions whose binding references `controller`.
    pub fn users_of(&self, controller: usize) -> Vec<&'static str> {
        let mut users: Vec<&'static str> = Action::ENTRIES
            .into_iter()
            .filter(|action| {
                self.entry(*action)
                    .and_then(|entry| entry.controller())
                    .is_some_and(|c| c == controller)
            })
            .map(Action::name)
            .collect();
        if self.shifter.controller == Some(controller) {
            users.push("SHIFTER");
        }
        users
    }

    pub fn is_controller_in_use(&self, controller: usize) -> bool {
        !self.users_of(controller).is_empty()
    }

    /// Replace the curated device list from a fresh enumeration.
    pub fn set_devices(&mut self, discovered: impl IntoIterator<Item = DeviceDescriptor>) {
        self.devices.set_devices(discovered);
        info!(count = self.devices.len(), "Device list updated");
    }

    /// Remove the device matching `guid` from the curated list. Refused while
    /// a binding still uses it.
    pub fn remove_device(&mut self, guid: &str) -> BindingsResult<CuratedDevice> {
        let position = self
            .devices
            .find_by_guid(guid)
            .ok_or_else(|| DeviceError::not_found(guid.trim()))?;

        if let Some(device) = self.devices.get(position) {
            let users = device
                .original_index
                .map(|index| self.users_of(index))
                .unwrap_or_default();
            if !users.is_empty() {
                return Err(ConflictError::device_in_use(format!(
                    "{} ({})",
                    device.name(),
                    users.join(", ")
                ))
                .into());
            }
        }

        let removed = self
            .devices
            .remove_at(position)
            .ok_or_else(|| DeviceError::not_found(guid.trim()))?;
        info!(device = %removed.name(), "Device removed");
        Ok(removed)
    }

    /// Empty the curated list. Refused while any listed device is in use.
    pub fn remove_all_devices(&mut self) -> BindingsResult<usize> {
        let in_use: Vec<&str> = self
            .devices
            .iter()
            .filter(|device| {
                device
                    .original_index
                    .is_some_and(|index| self.is_controller_in_use(index))
            })
            .map(CuratedDevice::name)
            .collect();
        if !in_use.is_empty() {
            return Err(ConflictError::device_in_use(in_use.join(", ")).into());
        }
        let count = self.devices.clear();
        info!(count, "All devices removed");
        Ok(count)
    }

    /// Display name of the device a binding's controller index refers to.
    pub fn controller_name(&self, controller: usize) -> &str {
        self.devices
            .by_original(controller)
            .map_or("Unknown", |device| device.descriptor.display_name())
    }
}

/// `ACTION_n` for entries, `GEAR_x` for gears.
fn parse_binding_id(binding_id: &str) -> Result<Action, ConfigurationError> {
    let id = binding_id.trim();
    let (head, tail) = id
        .rsplit_once('_')
        .ok_or_else(|| ConfigurationError::unknown_action(id))?;

    if head.eq_ignore_ascii_case("GEAR") {
        return id.parse::<Gear>().map(Action::Gear);
    }
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigurationError::unknown_action(id));
    }
    match head.parse::<Action>()? {
        Action::Gear(_) => Err(ConfigurationError::unknown_action(id)),
        action => Ok(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openracing_errors::BinderError;

    fn wheel_and_pedals() -> Controls {
        let mut controls = Controls::new();
        controls.set_devices(vec![
            DeviceDescriptor::new("{W}", "Wheel"),
            DeviceDescriptor::new("{P}", "Pedals").with_product_guid("{PP}"),
        ]);
        controls
    }

    #[test]
    fn test_defaults() {
        let controls = Controls::new();
        assert!(controls.steer.rotation_tuning().is_some());
        assert!(controls.throttle.range_tuning().is_some());
        assert_eq!(controls.handbrake.fallback_key, Some(KeyCode::H));
        assert_eq!(controls.gear_up.fallback_key, Some(KeyCode::W));
        assert_eq!(controls.gear_down.fallback_key, Some(KeyCode::S));
        assert_eq!(controls.camera.fallback_key, Some(KeyCode::C));
        assert_eq!(controls.paddle_up.fallback_key, None);
        assert!(Action::ENTRIES.iter().all(|a| controls.entry(*a).is_some()));
    }

    #[test]
    fn test_assign_checks_entry_kind() {
        let mut controls = Controls::new();
        assert!(controls.assign_axis(Action::Throttle, 1, AxisIndex::new(2)));
        assert!(!controls.assign_axis(Action::GearUp, 1, AxisIndex::new(2)));
        assert!(!controls.assign_button(Action::Steer, 0, 4));
        assert!(controls.assign_button(Action::Camera, 0, 4));
        assert_eq!(controls.camera.binding(), Some((0, 4)));
        assert_eq!(controls.throttle.binding(), Some((1, AxisIndex::new(2))));
    }

    #[test]
    fn test_last_writer_wins_on_shared_axis() {
        let mut controls = Controls::new();
        controls.assign_axis(Action::Throttle, 0, AxisIndex::new(1));
        controls.assign_axis(Action::Brakes, 0, AxisIndex::new(1));
        assert!(controls.throttle.is_bound());
        assert!(controls.brakes.is_bound());
    }

    #[test]
    fn test_gear_button_goes_to_shifter() {
        let mut controls = Controls::new();
        assert!(controls.assign_button(Action::Gear(Gear::Third), 2, 10));
        assert!(controls.shifter.is_active());
        assert_eq!(controls.shifter.controller, Some(2));
        assert_eq!(controls.shifter.gear_button(Gear::Third), Some(10));
    }

    #[test]
    fn test_unbind_shifter_pseudo_action() {
        let mut controls = Controls::new();
        controls.assign_gear(Gear::First, 1, 0);
        controls.assign_gear(Gear::Second, 1, 1);
        assert!(controls.unbind(UnbindTarget::Shifter));
        assert!(!controls.shifter.is_active());
        assert!(!controls.shifter.any_assigned());
    }

    #[test]
    fn test_unbind_last_gear_deactivates() {
        let mut controls = Controls::new();
        controls.assign_gear(Gear::Reverse, 3, 7);
        controls.unbind(UnbindTarget::Action(Action::Gear(Gear::Reverse)));
        assert!(!controls.shifter.is_active());
        assert_eq!(controls.shifter.controller, None);

        assert!(!controls.activate_shifter(3));
        assert!(!controls.shifter.is_active());

        controls.set_gear_button(Gear::First, Some(2));
        assert!(!controls.shifter.is_active());
        assert!(controls.activate_shifter(3));
        assert!(controls.shifter.is_active());
    }

    #[test]
    fn test_unbind_all() {
        let mut controls = wheel_and_pedals();
        controls.assign_axis(Action::Steer, 0, AxisIndex::new(0));
        controls.assign_button(Action::GearUp, 0, 5);
        controls.assign_gear(Gear::First, 0, 8);
        controls.unbind_all();
        assert!(Action::ENTRIES.iter().all(|a| controls
            .entry(*a)
            .is_some_and(|entry| !entry.is_bound())));
        assert!(!controls.shifter.is_active());
        assert_eq!(controls.gear_up.fallback_key, Some(KeyCode::W));
        assert_eq!(controls.devices.len(), 2);
    }

    #[test]
    fn test_unbind_binding_ids() -> Result<(), Box<dyn std::error::Error>> {
        let mut controls = Controls::new();
        controls.assign_axis(Action::Throttle, 0, AxisIndex::new(1));
        controls.assign_button(Action::Camera, 0, 2);
        controls.assign_gear(Gear::Third, 0, 9);

        assert_eq!(controls.unbind_binding("THROTTLE_1")?, Action::Throttle);
        assert_eq!(controls.unbind_binding("camera_1")?, Action::Camera);
        assert_eq!(controls.unbind_binding("GEAR_3")?, Action::Gear(Gear::Third));
        assert!(!controls.throttle.is_bound());
        assert!(!controls.camera.is_bound());
        assert!(!controls.shifter.is_active());

        assert!(controls.unbind_binding("THROTTLE").is_err());
        assert!(controls.unbind_binding("WIPERS_1").is_err());
        assert!(matches!(
            controls.unbind_binding("GEAR_9"),
            Err(ConfigurationError::InvalidGear(_))
        ));
        Ok(())
    }

    #[test]
    fn test_controller_in_use() {
        let mut controls = Controls::new();
        assert!(!controls.is_controller_in_use(1));
        controls.assign_axis(Action::Clutch, 1, AxisIndex::new(0));
        controls.assign_gear(Gear::Fifth, 1, 3);
        assert_eq!(controls.users_of(1), vec!["CLUTCH", "SHIFTER"]);
        assert!(controls.is_controller_in_use(1));
    }

    #[test]
    fn test_remove_device_in_use_is_refused() -> Result<(), Box<dyn std::error::Error>> {
        let mut controls = wheel_and_pedals();
        controls.assign_axis(Action::Throttle, 1, AxisIndex::new(0));

        let err = controls.remove_device("pp");
        assert!(matches!(
            err,
            Err(BinderError::Conflict(ConflictError::DeviceInUse(_)))
        ));
        assert_eq!(controls.devices.len(), 2);

        assert!(controls.remove_all_devices().is_err());

        controls.unbind(UnbindTarget::Action(Action::Throttle));
        let removed = controls.remove_device("{P}")?;
        assert_eq!(removed.name(), "Pedals");
        assert_eq!(controls.remove_all_devices()?, 1);
        assert!(controls.devices.is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_unknown_device() {
        let mut controls = wheel_and_pedals();
        assert!(matches!(
            controls.remove_device("{nope}"),
            Err(BinderError::Device(DeviceError::NotFound(_)))
        ));
    }

    #[test]
    fn test_controller_name() {
        let controls = wheel_and_pedals();
        assert_eq!(controls.controller_name(1), "Pedals");
        assert_eq!(controls.controller_name(9), "Unknown");
    }

    #[test]
    fn test_input_method_parse() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!("wheel".parse::<InputMethod>()?, InputMethod::Wheel);
        assert_eq!("0".parse::<InputMethod>()?, InputMethod::Keyboard);
        assert!("joystick".parse::<InputMethod>().is_err());
        Ok(())
    }

    #[test]
    fn test_json_state_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let mut controls = wheel_and_pedals();
        controls.assign_axis(Action::Steer, 0, AxisIndex::new(0));
        controls.assign_gear(Gear::Reverse, 0, 14);
        let json = serde_json::to_string(&controls)?;
        let back: Controls = serde_json::from_str(&json)?;
        assert_eq!(back, controls);

        let partial: Controls = serde_json::from_str("{}")?;
        assert_eq!(partial, Controls::new());
        Ok(())
    }
}
