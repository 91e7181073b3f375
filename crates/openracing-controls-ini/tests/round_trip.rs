//! Writing, reading and writing again produces identical text.

use openracing_bindings::{
    Action, AxisIndex, AxisTuning, Controls, EntryRef, Gear, KeyCode, RangeTuning, UnbindTarget,
};
use openracing_controls_ini::{deserialize_controls, serialize_controls};
use openracing_input_source::DeviceDescriptor;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

type RotationParams = (u32, u8, bool, u8, u8, f64, f64, u32);

prop_compose! {
    fn arb_devices()(
        names in vec(" {0,2}[A-Za-z0-9][A-Za-z0-9 ]{0,10}[A-Za-z0-9] {0,2}", 0..5)
    ) -> Vec<DeviceDescriptor> {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                DeviceDescriptor::new(format!("{{{i:08X}-0000}}"), name)
                    .with_product_guid(format!("PROD-{i}"))
            })
            .collect()
    }
}

prop_compose! {
    fn arb_controls()(
        devices in arb_devices(),
        axes in vec((0usize..5, 0usize..6, 0usize..8), 0..6),
        buttons in vec((5usize..10, 0usize..6, 0usize..32), 0..6),
        gears in vec((0usize..8, 0usize..6, 0usize..32), 0..4),
        ranges in vec((0u8..=100, 0u8..=100), 4),
        rotation in (90u32..=2520, 0u8..=100, any::<bool>(), 0u8..=100, 0u8..=100, 0.0f64..2.0, 0.0f64..1.0, 0u32..50),
        keys in vec(option::of(any::<u8>()), 5),
        method in 0usize..3,
        unbinds in vec(0usize..18, 0..3),
        shifter_on in option::of(0usize..6),
    ) -> Controls {
        Scenario { devices, axes, buttons, gears, ranges, rotation, keys, method, unbinds, shifter_on }
            .build()
    }
}

/// Operations applied to a fresh model, in order.
struct Scenario {
    devices: Vec<DeviceDescriptor>,
    axes: Vec<(usize, usize, usize)>,
    buttons: Vec<(usize, usize, usize)>,
    gears: Vec<(usize, usize, usize)>,
    ranges: Vec<(u8, u8)>,
    rotation: RotationParams,
    keys: Vec<Option<u8>>,
    method: usize,
    unbinds: Vec<usize>,
    shifter_on: Option<usize>,
}

impl Scenario {
    fn build(self) -> Controls {
        let Scenario {
            devices,
            axes,
            buttons,
            gears,
            ranges,
            rotation,
            keys,
            method,
            unbinds,
            shifter_on,
        } = self;
        let mut controls = Controls::new();
        controls.set_devices(devices);
        controls.input_method = match method {
            0 => "KEYBOARD",
            1 => "WHEEL",
            _ => "GAMEPAD",
        }
        .parse()
        .unwrap_or_default();

        for &(action, controller, axis) in &axes {
            if let Some(action) = Action::ENTRIES.get(action) {
                controls.assign_axis(*action, controller, AxisIndex::new(axis));
            }
        }
        for &(action, controller, button) in &buttons {
            if let Some(action) = Action::ENTRIES.get(action) {
                controls.assign_button(*action, controller, button);
            }
        }
        for &(gear, controller, button) in &gears {
            if let Some(gear) = Gear::ALL.get(gear) {
                controls.assign_gear(*gear, controller, button);
            }
        }

        for (entry, &(from, to)) in [
            &mut controls.throttle,
            &mut controls.brakes,
            &mut controls.clutch,
            &mut controls.handbrake,
        ]
        .into_iter()
        .zip(&ranges)
        {
            entry.tuning = AxisTuning::Range(RangeTuning::new(from, to));
        }

        if let AxisTuning::Rotation(tuning) = &mut controls.steer.tuning {
            let (lock, scale, invert, filter, speed, gain, ff_filter, debounce) = rotation;
            tuning.degrees_of_rotation = lock;
            tuning.scale = scale;
            tuning.invert = invert;
            tuning.filter = filter;
            tuning.speed_sensitivity = speed;
            tuning.ff_gain = gain;
            tuning.ff_filter = ff_filter;
            tuning.debouncing_ms = debounce;
        }

        let key = |i: usize| keys.get(i).copied().flatten().map(KeyCode::new);
        controls.handbrake.fallback_key = key(0);
        controls.gear_up.fallback_key = key(1);
        controls.gear_down.fallback_key = key(2);
        controls.camera.fallback_key = key(3);
        controls.reset_race_key = key(4);

        for &index in &unbinds {
            if let Some(action) = Action::all().nth(index) {
                controls.unbind(UnbindTarget::Action(action));
            }
        }
        if let Some(controller) = shifter_on {
            controls.activate_shifter(controller);
        }
        controls
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn prop_write_read_write_is_stable(controls in arb_controls()) {
        let first = serialize_controls(&controls);
        let second = serialize_controls(&deserialize_controls(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_bindings_survive_at_output_positions(controls in arb_controls()) {
        let loaded = deserialize_controls(&serialize_controls(&controls));
        for action in Action::ENTRIES {
            let before = controls.entry(action).and_then(|e| match e {
                EntryRef::Axis(a) => a.binding().map(|(c, x)| (c, x.get())),
                EntryRef::Button(b) => b.binding(),
            });
            let after = loaded.entry(action).and_then(|e| match e {
                EntryRef::Axis(a) => a.binding().map(|(c, x)| (c, x.get())),
                EntryRef::Button(b) => b.binding(),
            });
            let expected = before.map(|(c, i)| (controls.devices.output_index(c), i));
            prop_assert_eq!(after, expected, "{}", action);
        }
        prop_assert_eq!(loaded.shifter.is_active(), controls.shifter.is_active());
        prop_assert_eq!(loaded.reset_race_key, controls.reset_race_key);
        prop_assert_eq!(loaded.input_method, controls.input_method);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(text in "(\\PC{0,30}\n){0,12}") {
        let controls = deserialize_controls(&text);
        let written = serialize_controls(&controls);
        prop_assert!(written.starts_with("[HEADER]\n"));
    }
}

#[test]
fn test_padded_device_names_write_the_same_text_twice() {
    let mut controls = Controls::new();
    controls.set_devices(vec![
        DeviceDescriptor::new("{W}", "Wheel "),
        DeviceDescriptor::new("{P}", "  Pedals"),
    ]);
    controls.assign_axis(Action::Steer, 0, AxisIndex::new(0));

    let first = serialize_controls(&controls);
    assert!(first.contains("CON0=Pedals\n"));
    assert!(first.contains("CON1=Wheel\n"));
    assert_eq!(serialize_controls(&deserialize_controls(&first)), first);
}

#[test]
fn test_activating_shifter_without_gears_writes_inactive() {
    let mut controls = Controls::new();
    controls.set_devices(vec![DeviceDescriptor::new("{S}", "Shifter")]);
    assert!(!controls.activate_shifter(0));

    let first = serialize_controls(&controls);
    assert!(first.contains("[SHIFTER]\nACTIVE=0\nJOY=-1\n"));
    assert_eq!(serialize_controls(&deserialize_controls(&first)), first);
}

#[test]
fn test_values_rounding_to_whole_numbers_are_stable() {
    let mut controls = Controls::new();
    controls.throttle.tuning = AxisTuning::Range(RangeTuning::new(1, 99));
    if let AxisTuning::Rotation(tuning) = &mut controls.steer.tuning {
        tuning.ff_gain = 0.96;
        tuning.scale = 99;
    }

    let first = serialize_controls(&controls);
    assert!(first.contains("SCALE=1\n"));
    assert!(first.contains("FF_GAIN=1\n"));
    assert!(first.contains("MIN=-1\nMAX=1\n"));
    assert_eq!(serialize_controls(&deserialize_controls(&first)), first);
}

#[test]
fn test_legacy_file_without_paddle_sections() {
    let text = "[GEARUP]\nJOY=0\nBUTTON=3\nKEY=0x57\n__CM_ALT_BUTTON=7\n__CM_ALT_JOY=1\n";
    let controls = deserialize_controls(text);
    assert_eq!(controls.paddle_up.binding(), Some((1, 7)));
    assert_eq!(controls.gear_up.binding(), Some((0, 3)));
}
