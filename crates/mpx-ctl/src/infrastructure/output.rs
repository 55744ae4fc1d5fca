//! Plain-text rendering of command results.
//!
//! With `--json` the binary prints the same data through `serde_json`
//! instead; see [`to_json`].

use std::fmt::Write as _;

use mpx_core::{DeviceMapDocument, DeviceStatus, SeatConfigDocument, SeatStatus, StatusSnapshot};
use serde::Serialize;

use crate::application::simulate::SimulationRun;
use crate::error::CtlError;

const RULE: &str = "========================================";

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CtlError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// The `config` command's JSON shape.
#[derive(Debug, Serialize)]
pub struct ConfigView<'a> {
    pub config: &'a SeatConfigDocument,
    pub devices: &'a DeviceMapDocument,
}

pub fn seats_text(seats: &[SeatStatus], default_seat: &str) -> String {
    let mut out = String::from("Seats:\n");
    for seat in seats {
        let default = if seat.name == default_seat {
            " [default]"
        } else {
            ""
        };
        let state = if seat.enabled { "enabled" } else { "disabled" };
        let grab = match &seat.grab {
            Some(grab) => format!(" [{} by {}]", grab.mode, grab.client),
            None => String::new(),
        };
        let _ = writeln!(out, "  {} ({}){default}", seat.name, seat.id);
        let _ = writeln!(out, "    State: {state}{grab}");
        let _ = writeln!(out, "    Cursor: ({:.0}, {:.0})", seat.cursor.x, seat.cursor.y);
        let _ = writeln!(out, "    Pointers: {}", seat.pointer_devices.len());
        let _ = writeln!(out, "    Keyboards: {}", seat.keyboard_devices.len());
    }
    out
}

pub fn devices_text(devices: &[DeviceStatus]) -> String {
    if devices.is_empty() {
        return "Devices:\n  (none)\n".to_string();
    }
    let mut out = String::from("Devices:\n");
    for device in devices {
        let assignment = match &device.seat {
            Some(seat) => format!("-> {seat}"),
            None => "(unassigned)".to_string(),
        };
        let availability = if device.available { "" } else { " [UNAVAILABLE]" };
        let _ = writeln!(out, "  {}", device.name);
        let _ = writeln!(out, "    ID: {}", device.id);
        let _ = writeln!(
            out,
            "    Type: {} ({})",
            device.kind,
            device.capabilities.join(", ")
        );
        if let Some(usb_id) = &device.usb_id {
            let _ = writeln!(out, "    USB: {usb_id}");
        }
        let _ = writeln!(out, "    Assignment: {assignment}{availability}");
    }
    out
}

pub fn status_text(status: &StatusSnapshot) -> String {
    let grabbed = status.seats.iter().filter(|s| s.grab.is_some()).count();
    let mut out = format!("MPX Status\n{RULE}\n");
    let _ = writeln!(out, "Default seat: {}", status.default_seat);
    let _ = writeln!(out, "Hot-plug policy: {}", status.hotplug_policy);
    let _ = writeln!(out, "Total seats: {}", status.seats.len());
    let _ = writeln!(out, "Grabbed seats: {grabbed}");
    let _ = writeln!(out, "Total devices: {}", status.devices.len());
    let _ = writeln!(out, "Assigned devices: {}", status.assigned_devices());
    let _ = writeln!(out, "Unassigned devices: {}", status.unassigned_devices());
    out
}

pub fn config_text(config: &SeatConfigDocument, devices: &DeviceMapDocument) -> String {
    let global = &config.global_config;
    let mut out = format!("Configuration\n{RULE}\n\nGlobal settings:\n");
    let _ = writeln!(out, "  auto_assign_new_devices: {}", global.auto_assign_new_devices);
    let _ = writeln!(out, "  default_seat: {}", global.default_seat);
    let _ = writeln!(out, "  hotplug_policy: {}", global.effective_hotplug_policy());

    out.push_str("\nConfigured seats:\n");
    for seat in &config.seats {
        let _ = write!(
            out,
            "  {}: enabled={}, cursor_size={}",
            seat.name, seat.enabled, seat.cursor_size
        );
        if let Some(theme) = &seat.cursor_theme {
            let _ = write!(out, ", cursor_theme={theme}");
        }
        out.push('\n');
    }

    out.push_str("\nDevice mappings:\n");
    if devices.mappings.is_empty() {
        out.push_str("  (none)\n");
    }
    for mapping in &devices.mappings {
        let seat = mapping.seat_name.as_deref().unwrap_or("(unassigned)");
        let label = if mapping.is_usb_rule() {
            "usb rule"
        } else {
            mapping.device_name.as_str()
        };
        let _ = writeln!(out, "  {} -> {seat} ({label})", mapping.device_id);
    }
    out
}

/// The scenario report, followed by any renders.
pub fn simulation_text(run: &SimulationRun) -> String {
    let mut out = run.report.clone();
    for render in &run.renders {
        let _ = write!(out, "\n--- {} ---\n{}\n", render.scenario, render.ascii);
    }
    out
}
