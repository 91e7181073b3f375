//! Explicit bind requests
//!
//! Requests carry caller-facing numbers: signed so negative input can be
//! rejected with the offending value, and with 1-based axes. Validation
//! happens before any mutation.

use std::collections::BTreeMap;

use openracing_errors::{ConfigurationError, ensure_config};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Action, AxisIndex, Controls, Gear, InputKind};

/// Bind one action to a controller's axis or button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRequest {
    pub action: String,
    pub controller_index: i64,
    /// 1-based axis number.
    #[serde(default)]
    pub axis: Option<i64>,
    /// 0-based button index.
    #[serde(default)]
    pub button: Option<i64>,
}

/// A physical input after validation, in internal numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundInput {
    Axis(AxisIndex),
    Button(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedBind {
    pub action: Action,
    pub controller: usize,
    pub input: BoundInput,
}

impl BindRequest {
    pub fn axis(action: impl Into<String>, controller_index: i64, axis: i64) -> Self {
        Self {
            action: action.into(),
            controller_index,
            axis: Some(axis),
            button: None,
        }
    }

    pub fn button(action: impl Into<String>, controller_index: i64, button: i64) -> Self {
        Self {
            action: action.into(),
            controller_index,
            axis: None,
            button: Some(button),
        }
    }

    pub fn validate(&self) -> Result<ValidatedBind, ConfigurationError> {
        let action: Action = self.action.parse()?;
        let controller = non_negative("controller", self.controller_index)?;

        let input = match action.input_kind() {
            InputKind::Axis => {
                let Some(number) = self.axis else {
                    return Err(match self.button {
                        Some(_) => ConfigurationError::wrong_input(action.name(), "button"),
                        None => ConfigurationError::MissingInput(action.name().to_string()),
                    });
                };
                BoundInput::Axis(one_based_axis(number)?)
            }
            InputKind::Button => {
                let Some(button) = self.button else {
                    return Err(match self.axis {
                        Some(_) => ConfigurationError::wrong_input(action.name(), "axis"),
                        None => ConfigurationError::MissingInput(action.name().to_string()),
                    });
                };
                BoundInput::Button(non_negative("button", button)?)
            }
        };

        Ok(ValidatedBind {
            action,
            controller,
            input,
        })
    }
}

/// Bind several H-shifter gears on one controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HShifterRequest {
    pub controller_index: i64,
    /// Gear name (`GEAR_1`..`GEAR_7`, `GEAR_R`) to 0-based button.
    pub gears: BTreeMap<String, i64>,
}

/// Bind sequential up/down buttons on one controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequentialRequest {
    pub controller_index: i64,
    #[serde(default)]
    pub gear_up: Option<i64>,
    #[serde(default)]
    pub gear_down: Option<i64>,
}

impl Controls {
    /// Validate and apply one bind. Nothing changes when validation fails.
    pub fn bind(&mut self, request: &BindRequest) -> Result<ValidatedBind, ConfigurationError> {
        let bind = request.validate()?;
        let applied = match bind.input {
            BoundInput::Axis(axis) => self.assign_axis(bind.action, bind.controller, axis),
            BoundInput::Button(button) => self.assign_button(bind.action, bind.controller, button),
        };
        ensure_config!(
            applied,
            ConfigurationError::wrong_input(bind.action.name(), input_name(bind.input))
        );
        info!(action = %bind.action, controller = bind.controller, "Bound");
        Ok(bind)
    }

    /// Assign every listed gear and activate the shifter on the controller.
    pub fn bind_h_shifter(&mut self, request: &HShifterRequest) -> Result<usize, ConfigurationError> {
        let controller = non_negative("controller", request.controller_index)?;
        ensure_config!(
            !request.gears.is_empty(),
            ConfigurationError::MissingInput("H_SHIFTER".to_string())
        );

        let gears = request
            .gears
            .iter()
            .map(|(name, button)| Ok((name.parse::<Gear>()?, non_negative("button", *button)?)))
            .collect::<Result<Vec<(Gear, usize)>, ConfigurationError>>()?;

        for (gear, button) in &gears {
            self.shifter.set_gear_button(*gear, Some(*button));
        }
        self.shifter.activate(Some(controller));
        info!(controller, gears = gears.len(), "H-shifter bound");
        Ok(gears.len())
    }

    /// Assign GEARUP and/or GEARDN on one controller.
    pub fn bind_sequential(&mut self, request: &SequentialRequest) -> Result<(), ConfigurationError> {
        let controller = non_negative("controller", request.controller_index)?;
        ensure_config!(
            request.gear_up.is_some() || request.gear_down.is_some(),
            ConfigurationError::MissingInput("SEQUENTIAL".to_string())
        );
        let up = request
            .gear_up
            .map(|b| non_negative("button", b))
            .transpose()?;
        let down = request
            .gear_down
            .map(|b| non_negative("button", b))
            .transpose()?;

        if let Some(button) = up {
            self.gear_up.assign(controller, button);
        }
        if let Some(button) = down {
            self.gear_down.assign(controller, button);
        }
        info!(controller, ?up, ?down, "Sequential shifter bound");
        Ok(())
    }
}

fn input_name(input: BoundInput) -> &'static str {
    match input {
        BoundInput::Axis(_) => "axis",
        BoundInput::Button(_) => "button",
    }
}

fn non_negative(field: &str, value: i64) -> Result<usize, ConfigurationError> {
    usize::try_from(value)
        .ok()
        .ok_or_else(|| ConfigurationError::bad_index(field, value))
}

/// 1-based axis number to the internal index; 0 and negatives are rejected.
fn one_based_axis(number: i64) -> Result<AxisIndex, ConfigurationError> {
    usize::try_from(number)
        .ok()
        .and_then(AxisIndex::from_one_based)
        .ok_or_else(|| ConfigurationError::bad_index("axis", number))
}
