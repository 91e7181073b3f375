//! Controls file reader
//!
//! Reading starts from [`Controls::new`] and overwrites whatever the file
//! provides. Devices are restored in file order with their position as the
//! original index, so JOY values map back onto the same devices. Values that
//! fail to parse keep the default and are logged.

use openracing_bindings::{
    AxisEntry, AxisIndex, AxisTuning, ButtonEntry, Controls, CuratedDevice, Gear, KeyCode,
    RangeTuning, fraction_to_percent, parse_optional_key,
};
use openracing_input_source::DeviceDescriptor;
use tracing::{debug, warn};

use crate::document::{IniDocument, Section};
use crate::value::{parse_float, parse_index, parse_int};

/// Parse a controls file.
pub fn deserialize_controls(text: &str) -> Controls {
    let document = IniDocument::parse(text);
    for warning in document.warnings() {
        debug!(%warning, "Skipped controls line");
    }
    controls_from_document(&document)
}

pub fn controls_from_document(document: &IniDocument) -> Controls {
    let mut controls = Controls::new();

    if let Some(method) = document.get("HEADER", "INPUT_METHOD") {
        match method.parse() {
            Ok(method) => controls.input_method = method,
            Err(e) => warn!(error = %e, "Ignoring input method"),
        }
    }

    if let Some(section) = document.section("CONTROLLERS") {
        controls.devices.restore(read_devices(section));
    }

    if let Some(section) = document.section("STEER") {
        read_axis(section, &mut controls.steer);
    }
    for (name, entry) in [
        ("THROTTLE", &mut controls.throttle),
        ("BRAKES", &mut controls.brakes),
        ("CLUTCH", &mut controls.clutch),
        ("HANDBRAKE", &mut controls.handbrake),
    ] {
        if let Some(section) = document.section(name) {
            read_axis(section, entry);
        }
    }

    for (name, entry) in [
        ("GEARUP", &mut controls.gear_up),
        ("GEARDN", &mut controls.gear_down),
        ("ACTION_CHANGE_CAMERA", &mut controls.camera),
    ] {
        if let Some(section) = document.section(name) {
            read_button(section, entry);
        }
    }

    read_paddle(document, "__EXT_GEAR_UP", "GEARUP", &mut controls.paddle_up);
    read_paddle(document, "__EXT_GEAR_DOWN", "GEARDN", &mut controls.paddle_down);

    if let Some(section) = document.section("SHIFTER") {
        read_shifter(section, &mut controls);
    }

    if let Some(value) = document.get("RESET_RACE", "KEY") {
        controls.reset_race_key = read_key(value, "RESET_RACE", controls.reset_race_key);
    }

    controls
}

fn read_devices(section: &Section) -> Vec<CuratedDevice> {
    (0..)
        .map_while(|position: usize| {
            let name = section.get(&format!("CON{position}"))?;
            let instance = section.get(&format!("__IGUID{position}")).unwrap_or_default();
            let product = section.get(&format!("PGUID{position}")).unwrap_or_default();
            Some(CuratedDevice::new(
                DeviceDescriptor::new(instance, name).with_product_guid(product),
                position,
            ))
        })
        .collect()
}

fn read_axis(section: &Section, entry: &mut AxisEntry) {
    entry.controller = section.get("JOY").and_then(parse_index);
    entry.axis = section.get("AXLE").and_then(parse_index).map(AxisIndex::new);

    match &mut entry.tuning {
        AxisTuning::Rotation(rotation) => {
            if let Some(scale) = section.get("SCALE").and_then(parse_float) {
                rotation.set_signed_scale(scale);
            }
            if let Some(lock) = section.get("LOCK").and_then(parse_u32) {
                rotation.degrees_of_rotation = lock;
            }
            if let Some(ms) = section.get("DEBOUNCING_MS").and_then(parse_u32) {
                rotation.debouncing_ms = ms;
            }
            if let Some(gain) = section.get("FF_GAIN").and_then(parse_float) {
                rotation.ff_gain = gain;
            }
            if let Some(filter) = section.get("FILTER_FF").and_then(parse_float) {
                rotation.ff_filter = filter;
            }
            if let Some(filter) = section.get("STEER_FILTER").and_then(parse_float) {
                rotation.filter = fraction_to_percent(filter);
            }
            if let Some(speed) = section.get("SPEED_SENSITIVITY").and_then(parse_float) {
                rotation.speed_sensitivity = fraction_to_percent(speed);
            }
        }
        AxisTuning::Range(range) => {
            let min = section
                .get("MIN")
                .and_then(parse_float)
                .unwrap_or_else(|| range.min_value());
            let max = section
                .get("MAX")
                .and_then(parse_float)
                .unwrap_or_else(|| range.max_value());
            *range = RangeTuning::from_signed(min, max);
        }
    }

    if let Some(value) = section.get("KEY") {
        entry.fallback_key = read_key(value, &section.name, entry.fallback_key);
    }
}

fn read_button(section: &Section, entry: &mut ButtonEntry) {
    entry.controller = section.get("JOY").and_then(parse_index);
    entry.button = section.get("BUTTON").and_then(parse_index);
    if let Some(value) = section.get("KEY") {
        entry.fallback_key = read_key(value, &section.name, entry.fallback_key);
    }
}

/// Paddles live in their own sections; older files only carry the mirror
/// keys inside the sequential gear section.
fn read_paddle(document: &IniDocument, own: &str, mirror: &str, entry: &mut ButtonEntry) {
    if let Some(section) = document.section(own) {
        entry.controller = section.get("JOY").and_then(parse_index);
        entry.button = section.get("BUTTON").and_then(parse_index);
    } else if let Some(section) = document.section(mirror) {
        entry.controller = section.get("__CM_ALT_JOY").and_then(parse_index);
        entry.button = section.get("__CM_ALT_BUTTON").and_then(parse_index);
    }
}

fn read_shifter(section: &Section, controls: &mut Controls) {
    let shifter = &mut controls.shifter;
    shifter.reset();
    for gear in Gear::ALL {
        shifter.set_gear_button(gear, section.get(gear.name()).and_then(parse_index));
    }

    if section.get("ACTIVE").and_then(parse_int) == Some(1) {
        shifter.activate(section.get("JOY").and_then(parse_index));
    }
}

fn read_key(value: &str, section: &str, current: Option<KeyCode>) -> Option<KeyCode> {
    match parse_optional_key(value) {
        Ok(key) => key,
        Err(e) => {
            warn!(section, error = %e, "Ignoring key code");
            current
        }
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    parse_int(value).and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use openracing_bindings::InputMethod;

    const SAMPLE: &str = "\
[HEADER]
INPUT_METHOD=WHEEL

[CONTROLLERS]
CON0=Pedals
__IGUID0=aaaa-1
PGUID0=pppp-1
CON1=Wheel
__IGUID1=bbbb-2
PGUID1=pppp-2

[STEER]
JOY=1
AXLE=0
SCALE=-0.8
LOCK=540
DEBOUNCING_MS=5
FF_GAIN=0.7
FILTER_FF=0.1
STEER_FILTER=0.2
SPEED_SENSITIVITY=0.5
STEER_GAMMA=1

[THROTTLE]
JOY=0
AXLE=2
MIN=1
MAX=-1
GAMMA=1

[HANDBRAKE]
JOY=-1
BUTTON=-1
KEY=0x20 ; Space
AXLE=-1
GAMMA=1
MIN=-1
MAX=1

[GEARUP]
JOY=1
BUTTON=4
KEY=0x57 ; W
__CM_ALT_BUTTON=9
__CM_ALT_JOY=1

[SHIFTER]
ACTIVE=1
JOY=0
GEAR_1=12
GEAR_R=19

[RESET_RACE]
KEY=0x52 ; R
";

    #[test]
    fn test_read_sample() {
        let controls = deserialize_controls(SAMPLE);
        assert_eq!(controls.input_method, InputMethod::Wheel);
        assert_eq!(controls.devices.len(), 2);
        assert_eq!(controls.devices.output_index(1), 1);
        assert_eq!(controls.controller_name(1), "Wheel");

        assert_eq!(controls.steer.binding(), Some((1, AxisIndex::new(0))));
        let rotation = controls.steer.rotation_tuning().copied().unwrap_or_default();
        assert!(rotation.invert);
        assert_eq!(rotation.scale, 80);
        assert_eq!(rotation.degrees_of_rotation, 540);
        assert_eq!(rotation.debouncing_ms, 5);
        assert_eq!(rotation.filter, 20);
        assert_eq!(rotation.speed_sensitivity, 50);

        assert_eq!(controls.throttle.binding(), Some((0, AxisIndex::new(2))));
        assert_eq!(controls.throttle.range_tuning(), Some(&RangeTuning::new(100, 0)));

        assert!(!controls.handbrake.is_bound());
        assert_eq!(controls.handbrake.fallback_key, Some(KeyCode::new(0x20)));

        assert_eq!(controls.gear_up.binding(), Some((1, 4)));
        assert_eq!(controls.paddle_up.binding(), Some((1, 9)));
        assert!(!controls.paddle_down.is_bound());

        assert!(controls.shifter.is_active());
        assert_eq!(controls.shifter.controller, Some(0));
        assert_eq!(controls.shifter.gear_button(Gear::First), Some(12));
        assert_eq!(controls.shifter.gear_button(Gear::Reverse), Some(19));
        assert_eq!(controls.shifter.gear_button(Gear::Second), None);

        assert_eq!(controls.reset_race_key, Some(KeyCode::new(0x52)));
    }

    #[test]
    fn test_missing_sections_keep_defaults() {
        let controls = deserialize_controls("");
        assert_eq!(controls, Controls::new());
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let controls = deserialize_controls(
            "[HEADER]\nINPUT_METHOD=JOYPAD\n[GEARDN]\nKEY=zz\nJOY=x\n[STEER]\nLOCK=-5\n",
        );
        assert_eq!(controls.input_method, InputMethod::Wheel);
        assert_eq!(controls.gear_down.fallback_key, Some(KeyCode::S));
        assert_eq!(controls.gear_down.controller, None);
        assert_eq!(
            controls.steer.rotation_tuning().map(|r| r.degrees_of_rotation),
            Some(900)
        );
    }

    #[test]
    fn test_active_flag_without_gears_is_ignored() {
        let controls = deserialize_controls("[SHIFTER]\nACTIVE=1\nJOY=2\n");
        assert!(!controls.shifter.is_active());
        assert_eq!(controls.shifter.controller, None);
    }
}
