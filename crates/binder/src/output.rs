//! Output formatting for CLI responses

use anyhow::Error;
use colored::Colorize;
use openracing_bindings::{ControlsSummary, CuratedDevice};
use openracing_errors::BinderError;
use openracing_input_source::DeviceDescriptor;
use racing_wheel_binder::SessionStatus;
use serde::Serialize;
use serde_json::{Value, json};

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error),
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> String {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<BinderError>())
        .map_or_else(|| "Other".to_string(), |e| e.category().to_string())
}

/// Print a one-line result, with optional payload in JSON mode
pub fn print_success<T: Serialize>(message: &str, payload: Option<(&str, &T)>, json: bool) {
    if json {
        let mut output = json!({ "success": true, "message": message });
        if let (Some((key, value)), Some(map)) = (payload, output.as_object_mut()) {
            map.insert(key.to_string(), json!(value));
        }
        print_json(&output);
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

/// Attached devices, marking the ones in the curated list
pub fn print_devices(devices: &[DeviceDescriptor], curated: &[CuratedDevice], json: bool) {
    if json {
        print_json(&json!({ "success": true, "devices": devices, "curated": curated }));
        return;
    }

    if devices.is_empty() {
        println!("{}", "No devices found".yellow());
        return;
    }

    println!("{}", "Attached Devices:".bold());
    for (index, device) in devices.iter().enumerate() {
        let listed = curated
            .iter()
            .any(|c| c.descriptor.matches_guid(&device.instance_guid));
        let marker = if listed { "●".green() } else { "○".dimmed() };
        println!(
            "  {} [{}] {} ({})",
            marker,
            index,
            device.display_name().bold(),
            device.instance_guid.dimmed()
        );
    }
}

pub fn print_session(status: &SessionStatus, json: bool) {
    if json {
        print_json(&json!({ "success": status.success, "session": status }));
        return;
    }

    let headline = if status.success {
        status.status_message.green()
    } else if status.is_cancelled {
        status.status_message.yellow()
    } else {
        status.status_message.red()
    };
    println!("{headline}");

    if let (Some(index), Some(name)) = (
        status.detected_controller_index,
        status.detected_controller_name.as_deref(),
    ) {
        println!("  Controller: {} [{}]", name.bold(), index);
    }
    if let Some(axis) = status.detected_axis {
        println!("  Axis: {axis}");
    }
    if let Some(button) = status.detected_button {
        println!("  Button: {button}");
    }
}

pub fn print_summary(summary: &ControlsSummary, json: bool) {
    if json {
        print_json(&json!({ "success": true, "controls": summary }));
        return;
    }

    println!("{} {}", "Input method:".bold(), summary.input_method);

    println!("{}", "Devices:".bold());
    if summary.devices.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for device in &summary.devices {
        println!("  [{}] {} ({})", device.index, device.name, device.instance_guid.dimmed());
    }

    println!("{}", "Bindings:".bold());
    for action in &summary.actions {
        let binding = match (action.controller_index, action.axis, action.button) {
            (Some(controller), Some(axis), _) => format!("controller {controller}, axis {axis}"),
            (Some(controller), _, Some(button)) => {
                format!("controller {controller}, button {button}")
            }
            _ => "unbound".dimmed().to_string(),
        };
        println!("  {:<10} {}", action.action, binding);
    }

    let shifter = &summary.shifter;
    let state = if shifter.active {
        "active".green()
    } else {
        "inactive".dimmed()
    };
    println!("{} {}", "H-shifter:".bold(), state);
    for (gear, button) in &shifter.gears {
        if let Some(button) = button {
            println!("  {gear:<10} button {button}");
        }
    }
}
