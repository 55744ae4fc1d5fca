//! Read-only snapshot of a registry, shaped for display and JSON output.

use serde::Serialize;

use crate::domain::{
    device::{DeviceId, DeviceKind},
    geometry::Position,
    grab::{ClientId, GrabMode},
    seat::{SeatId, WindowId},
};
use crate::registry::{HotplugPolicy, SeatManager};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub default_seat: String,
    pub hotplug_policy: HotplugPolicy,
    pub seats: Vec<SeatStatus>,
    pub devices: Vec<DeviceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatStatus {
    pub id: SeatId,
    pub name: String,
    pub enabled: bool,
    pub cursor: Position,
    pub cursor_size: u32,
    pub pointer_focus: Option<WindowId>,
    pub keyboard_focus: Option<WindowId>,
    pub grab: Option<GrabStatus>,
    pub pointer_devices: Vec<DeviceId>,
    pub keyboard_devices: Vec<DeviceId>,
    pub devices: Vec<DeviceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrabStatus {
    pub client: ClientId,
    pub mode: GrabMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub capabilities: Vec<String>,
    /// `vvvv:pppp`, when the device carries USB ids.
    pub usb_id: Option<String>,
    pub available: bool,
    /// Name of the assigned seat.
    pub seat: Option<String>,
}

impl StatusSnapshot {
    pub fn assigned_devices(&self) -> usize {
        self.devices.iter().filter(|d| d.seat.is_some()).count()
    }

    pub fn unassigned_devices(&self) -> usize {
        self.devices.len() - self.assigned_devices()
    }
}

impl SeatManager {
    /// Captures the current seats and devices.
    pub fn status(&self) -> StatusSnapshot {
        let seats = self
            .list_seats()
            .map(|seat| SeatStatus {
                id: seat.id(),
                name: seat.name().to_string(),
                enabled: seat.is_enabled(),
                cursor: seat.cursor(),
                cursor_size: seat.cursor_size(),
                pointer_focus: seat.pointer_focus().cloned(),
                keyboard_focus: seat.keyboard_focus().cloned(),
                grab: seat.pointer_grab().map(|grab| GrabStatus {
                    client: grab.client().clone(),
                    mode: grab.mode(),
                }),
                pointer_devices: seat.pointer_devices().iter().cloned().collect(),
                keyboard_devices: seat.keyboard_devices().iter().cloned().collect(),
                devices: seat.devices().iter().cloned().collect(),
            })
            .collect();

        let devices = self
            .list_devices()
            .map(|device| DeviceStatus {
                id: device.id().clone(),
                name: device.name().to_string(),
                kind: device.kind(),
                capabilities: device.capabilities().names(),
                usb_id: device.has_usb_ids().then(|| device.usb_identifier()),
                available: device.is_available(),
                seat: self
                    .seat_for_device(device.id())
                    .map(|seat| seat.name().to_string()),
            })
            .collect();

        StatusSnapshot {
            default_seat: self.default_seat().name().to_string(),
            hotplug_policy: self.hotplug_policy(),
            seats,
            devices,
        }
    }
}
