//! Caller-facing views of the registry. Axes are numbered from 1 here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Action, Controls, EntryRef, Gear, InputKind};

/// One physical input assigned to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    /// Id accepted by [`Controls::unbind_binding`].
    pub id: String,
    pub action: String,
    pub controller_index: usize,
    pub controller_name: String,
    pub input_type: InputKind,
    /// 1-based for axes, 0-based for buttons.
    pub input_index: usize,
    pub display_name: String,
}

/// An action group and its current bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionBindings {
    pub name: String,
    pub input_type: InputKind,
    pub description: String,
    pub bindings: Vec<BindingInfo>,
}

/// Flat per-action state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub action: String,
    pub controller_index: Option<usize>,
    /// 1-based.
    pub axis: Option<usize>,
    pub button: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShifterState {
    pub active: bool,
    pub controller_index: Option<usize>,
    pub gears: BTreeMap<String, Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    /// Output position.
    pub index: usize,
    pub original_index: Option<usize>,
    pub name: String,
    pub instance_guid: String,
    pub product_guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlsSummary {
    pub input_method: String,
    pub devices: Vec<DeviceState>,
    pub actions: Vec<ActionState>,
    pub shifter: ShifterState,
}

impl Controls {
    pub fn summary(&self) -> ControlsSummary {
        let actions = Action::ENTRIES
            .into_iter()
            .map(|action| {
                let (controller_index, axis, button) = match self.entry(action) {
                    Some(EntryRef::Axis(entry)) => {
                        (entry.controller, entry.axis.map(|a| a.one_based()), None)
                    }
                    Some(EntryRef::Button(entry)) => (entry.controller, None, entry.button),
                    None => (None, None, None),
                };
                ActionState {
                    action: action.name().to_string(),
                    controller_index,
                    axis,
                    button,
                }
            })
            .collect();

        let devices = self
            .devices
            .iter()
            .enumerate()
            .map(|(index, device)| DeviceState {
                index,
                original_index: device.original_index,
                name: device.descriptor.name.clone(),
                instance_guid: device.descriptor.instance_guid.clone(),
                product_guid: device.descriptor.product_guid.clone(),
            })
            .collect();

        ControlsSummary {
            input_method: self.input_method.to_string(),
            devices,
            actions,
            shifter: ShifterState {
                active: self.shifter.is_active(),
                controller_index: self.shifter.controller,
                gears: Gear::ALL
                    .into_iter()
                    .map(|gear| (gear.name().to_string(), self.shifter.gear_button(gear)))
                    .collect(),
            },
        }
    }

    /// Bound inputs grouped by action. Gears are grouped under `GEARS`.
    pub fn bindings(&self) -> Vec<ActionBindings> {
        let order = [
            Action::Steer,
            Action::Throttle,
            Action::Brakes,
            Action::Clutch,
            Action::Handbrake,
            Action::GearUp,
            Action::PaddleUp,
            Action::GearDown,
            Action::PaddleDown,
        ];

        let mut groups: Vec<ActionBindings> = order
            .into_iter()
            .map(|action| self.action_group(action))
            .collect();

        let gears = self
            .shifter
            .assigned()
            .filter_map(|(gear, button)| {
                let controller = self.shifter.controller?;
                Some(self.button_info(gear.name().to_string(), Action::Gear(gear), controller, button))
            })
            .collect();
        groups.push(ActionBindings {
            name: "GEARS".to_string(),
            input_type: InputKind::Button,
            description: "H-Shifter gears (1-7 and R)".to_string(),
            bindings: gears,
        });

        groups.push(self.action_group(Action::Camera));
        groups
    }

    fn action_group(&self, action: Action) -> ActionBindings {
        let id = format!("{}_1", action.name());
        let binding = match self.entry(action) {
            Some(EntryRef::Axis(entry)) => entry.binding().map(|(controller, axis)| BindingInfo {
                id,
                action: action.name().to_string(),
                controller_index: controller,
                controller_name: self.controller_name(controller).to_string(),
                input_type: InputKind::Axis,
                input_index: axis.one_based(),
                display_name: axis.to_string(),
            }),
            Some(EntryRef::Button(entry)) => entry
                .binding()
                .map(|(controller, button)| self.button_info(id, action, controller, button)),
            None => None,
        };

        ActionBindings {
            name: action.name().to_string(),
            input_type: action.input_kind(),
            description: action.description().to_string(),
            bindings: binding.into_iter().collect(),
        }
    }

    fn button_info(&self, id: String, action: Action, controller: usize, button: usize) -> BindingInfo {
        BindingInfo {
            id,
            action: action.name().to_string(),
            controller_index: controller,
            controller_name: self.controller_name(controller).to_string(),
            input_type: InputKind::Button,
            input_index: button,
            display_name: format!("Button {button}"),
        }
    }
}
