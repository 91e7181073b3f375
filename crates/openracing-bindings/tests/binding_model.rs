//! Binding model behavior across modules.

use openracing_bindings::{Action, AxisIndex, BindRequest, Controls, Gear, UnbindTarget};
use openracing_input_source::DeviceDescriptor;
use proptest::prelude::*;

fn discovered() -> Vec<DeviceDescriptor> {
    vec![
        DeviceDescriptor::new("{0}", "Wheel Base"),
        DeviceDescriptor::new("{1}", "Load Cell Pedals"),
        DeviceDescriptor::new("{2}", "alpha handbrake"),
        DeviceDescriptor::new("{3}", "Button Box"),
    ]
}

#[test]
fn test_capture_index_three_sorts_to_position_one() {
    let mut controls = Controls::new();
    controls.set_devices(discovered());
    // alpha handbrake, Button Box, Load Cell Pedals, Wheel Base
    assert_eq!(controls.devices.output_index(3), 1);
    assert_eq!(controls.devices.output_index(2), 0);
    assert_eq!(controls.devices.output_index(1), 2);
    assert_eq!(controls.devices.output_index(0), 3);
}

#[test]
fn test_bind_request_then_summary_round_trips_axis_number() -> Result<(), Box<dyn std::error::Error>> {
    let mut controls = Controls::new();
    controls.set_devices(discovered());
    controls.bind(&BindRequest::axis("BRAKES", 1, 4))?;

    assert_eq!(controls.brakes.axis, Some(AxisIndex::new(3)));
    let summary = controls.summary();
    let brakes = summary
        .actions
        .iter()
        .find(|a| a.action == "BRAKES")
        .ok_or("missing BRAKES")?;
    assert_eq!(brakes.axis, Some(4));
    assert_eq!(brakes.controller_index, Some(1));
    Ok(())
}

#[test]
fn test_rejected_request_leaves_model_untouched() {
    let mut controls = Controls::new();
    controls.set_devices(discovered());
    let before = controls.clone();

    for request in [
        BindRequest::axis("STEER", 0, 0),
        BindRequest::axis("STEER", -2, 1),
        BindRequest::button("HANDBRAKE", 0, 3),
        BindRequest::axis("GEARUP", 0, 1),
        BindRequest::button("GEAR_9", 0, 1),
        BindRequest::button("NITRO", 0, 1),
    ] {
        assert!(controls.bind(&request).is_err(), "{request:?} should fail");
    }
    assert_eq!(controls, before);
}

#[test]
fn test_shifter_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut controls = Controls::new();
    controls.bind(&BindRequest::button("GEAR_1", 2, 8))?;
    controls.bind(&BindRequest::button("GEAR_2", 2, 9))?;
    assert!(controls.is_controller_in_use(2));

    controls.unbind(UnbindTarget::Action(Action::Gear(Gear::First)));
    assert!(controls.shifter.is_active());
    controls.unbind_binding("GEAR_2")?;
    assert!(!controls.shifter.is_active());
    assert!(!controls.is_controller_in_use(2));
    Ok(())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(200))]

    #[test]
    fn prop_external_axis_number_survives_bind(
        controller in 0i64..8,
        axis in 1i64..=8,
        action_index in 0usize..5,
    ) {
        let action = Action::ENTRIES.get(action_index).copied().unwrap_or(Action::Steer);
        let mut controls = Controls::new();
        let bind = controls.bind(&BindRequest::axis(action.name(), controller, axis));
        prop_assert!(bind.is_ok());

        let state = controls.summary();
        let entry = state.actions.iter().find(|a| a.action == action.name());
        prop_assert_eq!(entry.and_then(|e| e.axis).and_then(|a| i64::try_from(a).ok()), Some(axis));
    }

    #[test]
    fn prop_sorted_positions_are_a_permutation(names in proptest::collection::vec("[a-zA-Z ]{0,8}", 0..10)) {
        let mut controls = Controls::new();
        controls.set_devices(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| DeviceDescriptor::new(format!("{{{i}}}"), name.clone())),
        );
        let mut positions: Vec<usize> = (0..names.len())
            .map(|i| controls.devices.output_index(i))
            .collect();
        positions.sort_unstable();
        prop_assert_eq!(positions, (0..names.len()).collect::<Vec<_>>());

        let sorted: Vec<String> = controls.devices.iter().map(|d| d.name().to_lowercase()).collect();
        prop_assert!(sorted.windows(2).all(|w| w.first() <= w.get(1)));
    }
}
