//! Controls file writer
//!
//! Sections are emitted in the order the simulator ships them. Every section
//! is followed by a blank line. Controller indices are translated to output
//! positions through [`DeviceList::output_index`], and anything not fully
//! bound is written as `-1`.

use std::fmt::{self, Display};

use openracing_bindings::{
    AxisEntry, ButtonEntry, Controls, DeviceList, Gear, KeyCode, RotationTuning,
};
use openracing_input_source::strip_guid_braces;

use crate::value::{index_or_unset, normalize_value};

/// Sections the simulator expects that this tool never binds.
pub const UNMANAGED_ACTIONS: [&str; 15] = [
    "KERS",
    "DRS",
    "ACTION_HEADLIGHTS",
    "ACTION_HEADLIGHTS_FLASH",
    "ACTION_HORN",
    "BALANCEUP",
    "BALANCEDN",
    "TURBOUP",
    "TURBODN",
    "TCUP",
    "TCDN",
    "ABSUP",
    "ABSDN",
    "ENGINE_BRAKE_UP",
    "ENGINE_BRAKE_DN",
];

const KEYBOARD_DEFAULTS: [(&str, &str); 10] = [
    ("GAS", "-1"),
    ("BRAKE", "-1"),
    ("RIGHT", "-1"),
    ("LEFT", "-1"),
    ("STEERING_SPEED", "1.75"),
    ("STEERING_OPPOSITE_DIRECTION_SPEED", "2.5"),
    ("STEER_RESET_SPEED", "1.8"),
    ("MOUSE_STEER", "0"),
    ("MOUSE_ACCELERATOR_BRAKE", "0"),
    ("MOUSE_SPEED", "0.1"),
];

/// Line-oriented INI builder.
#[derive(Debug, Default)]
pub struct IniWriter {
    out: String,
    open: bool,
}

impl IniWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&mut self, name: &str) -> &mut Self {
        self.close();
        self.line(format_args!("[{name}]"));
        self.open = true;
        self
    }

    pub fn key(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.line(format_args!("{key}={value}"));
        self
    }

    pub fn finish(mut self) -> String {
        self.close();
        self.out
    }

    fn close(&mut self) {
        if self.open {
            self.out.push('\n');
            self.open = false;
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        self.out.push_str(&fmt::format(args));
        self.out.push('\n');
    }
}

/// Render `controls` as a complete controls file.
pub fn serialize_controls(controls: &Controls) -> String {
    let mut ini = IniWriter::new();
    let devices = &controls.devices;

    ini.section("HEADER")
        .key("INPUT_METHOD", controls.input_method);

    ini.section("CONTROLLERS");
    for (position, device) in devices.iter().enumerate() {
        ini.key(&format!("CON{position}"), device.name())
            .key(
                &format!("__IGUID{position}"),
                strip_guid_braces(&device.descriptor.instance_guid),
            )
            .key(
                &format!("PGUID{position}"),
                strip_guid_braces(&device.descriptor.product_guid),
            );
    }

    ini.section("STEER");
    write_axis(&mut ini, devices, &controls.steer);
    let rotation = controls.steer.rotation_tuning().copied().unwrap_or_default();
    write_rotation(&mut ini, &rotation);

    for (name, entry) in [
        ("THROTTLE", &controls.throttle),
        ("BRAKES", &controls.brakes),
        ("CLUTCH", &controls.clutch),
    ] {
        ini.section(name);
        write_axis(&mut ini, devices, entry);
        write_range(&mut ini, entry);
        ini.key("GAMMA", 1);
    }

    let handbrake = &controls.handbrake;
    ini.section("HANDBRAKE")
        .key("JOY", joy(devices, handbrake.binding().map(|(c, _)| c)))
        .key("BUTTON", -1)
        .key("KEY", KeyValue(handbrake.fallback_key))
        .key(
            "AXLE",
            index_or_unset(handbrake.binding().map(|(_, axis)| axis.get())),
        )
        .key("GAMMA", 1);
    write_range(&mut ini, handbrake);

    ini.section("GEARUP");
    write_button(&mut ini, devices, &controls.gear_up);
    write_alt_button(&mut ini, devices, &controls.paddle_up);

    ini.section("GEARDN");
    write_button(&mut ini, devices, &controls.gear_down);
    write_alt_button(&mut ini, devices, &controls.paddle_down);

    for (name, paddle) in [
        ("__EXT_GEAR_UP", &controls.paddle_up),
        ("__EXT_GEAR_DOWN", &controls.paddle_down),
    ] {
        let binding = paddle.binding();
        ini.section(name)
            .key("JOY", joy(devices, binding.map(|(c, _)| c)))
            .key("KEY", -1)
            .key("KEY_MODIFICATOR", "")
            .key("BUTTON", index_or_unset(binding.map(|(_, b)| b)))
            .key("BUTTON_MODIFICATOR", -1);
    }

    ini.section("ACTION_CHANGE_CAMERA");
    write_button(&mut ini, devices, &controls.camera);

    let shifter = &controls.shifter;
    let shifter_joy = shifter.controller.filter(|_| shifter.is_active());
    ini.section("SHIFTER")
        .key("ACTIVE", u8::from(shifter.is_active()))
        .key("JOY", joy(devices, shifter_joy));
    for gear in Gear::ALL {
        ini.key(gear.name(), index_or_unset(shifter.gear_button(gear)));
    }

    ini.section("RESET_RACE")
        .key("KEY", KeyValue(controls.reset_race_key))
        .key("JOY", -1)
        .key("BUTTON", -1)
        .key("BUTTON_MODIFICATOR", -1);

    ini.section("ADVANCED")
        .key("COMBINE_WITH_KEYBOARD_CONTROL", 0);

    for name in UNMANAGED_ACTIONS {
        ini.section(name)
            .key("JOY", -1)
            .key("KEY", -1)
            .key("BUTTON", -1);
    }

    ini.section("KEYBOARD");
    for (key, value) in KEYBOARD_DEFAULTS {
        ini.key(key, value);
    }

    for gear in Gear::ALL {
        ini.section(gear.name())
            .key("JOY", joy(devices, shifter.gear_controller(gear)));
    }

    ini.finish()
}

fn joy(devices: &DeviceList, controller: Option<usize>) -> String {
    index_or_unset(controller.map(|c| devices.output_index(c)))
}

fn write_axis(ini: &mut IniWriter, devices: &DeviceList, entry: &AxisEntry) {
    let binding = entry.binding();
    ini.key("JOY", joy(devices, binding.map(|(c, _)| c)))
        .key("AXLE", index_or_unset(binding.map(|(_, axis)| axis.get())));
}

fn write_rotation(ini: &mut IniWriter, rotation: &RotationTuning) {
    ini.key("SCALE", normalize_value(rotation.signed_scale()))
        .key("LOCK", rotation.degrees_of_rotation)
        .key("DEBOUNCING_MS", rotation.debouncing_ms)
        .key("FF_GAIN", normalize_value(rotation.ff_gain))
        .key("FILTER_FF", normalize_value(rotation.ff_filter))
        .key("STEER_FILTER", percent_value(rotation.filter))
        .key("SPEED_SENSITIVITY", percent_value(rotation.speed_sensitivity))
        .key("STEER_GAMMA", 1);
}

fn write_range(ini: &mut IniWriter, entry: &AxisEntry) {
    let range = entry.range_tuning().copied().unwrap_or_default();
    ini.key("MIN", normalize_value(range.min_value()))
        .key("MAX", normalize_value(range.max_value()));
}

fn write_button(ini: &mut IniWriter, devices: &DeviceList, entry: &ButtonEntry) {
    let binding = entry.binding();
    ini.key("JOY", joy(devices, binding.map(|(c, _)| c)))
        .key("BUTTON", index_or_unset(binding.map(|(_, b)| b)))
        .key("KEY", KeyValue(entry.fallback_key));
}

/// Paddle mirror written inside the sequential gear sections.
fn write_alt_button(ini: &mut IniWriter, devices: &DeviceList, paddle: &ButtonEntry) {
    let binding = paddle.binding();
    ini.key("__CM_ALT_BUTTON", index_or_unset(binding.map(|(_, b)| b)))
        .key("__CM_ALT_JOY", joy(devices, binding.map(|(c, _)| c)));
}

fn percent_value(percent: u8) -> String {
    normalize_value(f64::from(percent) / 100.0)
}

/// `0x48 ; H`, `0x7F`, or `-1` when there is no key.
struct KeyValue(Option<KeyCode>);

impl Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("-1"),
            Some(key) => match key.name() {
                Some(name) => write!(f, "{key} ; {name}"),
                None => write!(f, "{key}"),
            },
        }
    }
}
