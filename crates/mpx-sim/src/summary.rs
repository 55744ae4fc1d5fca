//! Serializable state summary with a human-readable rendering.

use std::fmt;

use mpx_core::{DeviceId, GrabMode, Position, Rect, WindowId};
use serde::Serialize;

use crate::compositor::VirtualCompositor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub display: Rect,
    pub seats: Vec<SeatSummary>,
    pub devices: Vec<DeviceSummary>,
    pub windows: Vec<WindowSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSummary {
    pub name: String,
    pub enabled: bool,
    pub cursor: Position,
    pub grab: Option<GrabMode>,
    pub pointer_focus: Option<WindowId>,
    pub keyboard_focus: Option<WindowId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary {
    pub id: DeviceId,
    pub name: String,
    pub connected: bool,
    pub seat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub id: WindowId,
    pub title: String,
    pub rect: Rect,
    pub grab: Option<GrabMode>,
}

impl VirtualCompositor {
    pub fn get_state_summary(&self) -> StateSummary {
        let manager = self.manager();
        StateSummary {
            display: self.display(),
            seats: manager
                .list_seats()
                .map(|seat| SeatSummary {
                    name: seat.name().to_string(),
                    enabled: seat.is_enabled(),
                    cursor: seat.cursor(),
                    grab: seat.pointer_grab().map(|g| g.mode()),
                    pointer_focus: seat.pointer_focus().cloned(),
                    keyboard_focus: seat.keyboard_focus().cloned(),
                })
                .collect(),
            devices: self
                .devices()
                .iter()
                .map(|device| DeviceSummary {
                    id: device.id().clone(),
                    name: device.name().to_string(),
                    connected: device.is_connected(),
                    seat: manager
                        .seat_for_device(device.id())
                        .map(|seat| seat.name().to_string()),
                })
                .collect(),
            windows: self
                .windows()
                .iter()
                .map(|window| WindowSummary {
                    id: window.id().clone(),
                    title: window.title().to_string(),
                    rect: window.rect(),
                    grab: self.window_grab(window.id()).map(|g| g.mode()),
                })
                .collect(),
        }
    }
}

impl fmt::Display for StateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation State ===")?;
        writeln!(f)?;

        writeln!(f, "Seats:")?;
        for seat in &self.seats {
            write!(
                f,
                "  {}: cursor at ({:.0}, {:.0})",
                seat.name, seat.cursor.x, seat.cursor.y
            )?;
            if seat.grab.is_some() {
                write!(f, " [POINTER GRABBED]")?;
            }
            if !seat.enabled {
                write!(f, " [DISABLED]")?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Devices:")?;
        for device in &self.devices {
            let status = if device.connected {
                "connected"
            } else {
                "disconnected"
            };
            writeln!(
                f,
                "  {}: {status}, assigned to {}",
                device.name,
                device.seat.as_deref().unwrap_or("(unassigned)")
            )?;
        }

        writeln!(f)?;
        write!(f, "Windows:")?;
        for window in &self.windows {
            write!(
                f,
                "\n  {}: ({}, {}) {}x{}",
                window.title, window.rect.x, window.rect.y, window.rect.width, window.rect.height
            )?;
            if let Some(mode) = window.grab {
                write!(f, " [GRAB: {mode}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_device::VirtualDevice;

    #[test]
    fn test_summary_text_lists_every_section() {
        // Arrange
        let mut comp = VirtualCompositor::new(1920, 1080);
        comp.create_seat("aux").unwrap();
        comp.connect_device(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0")
            .unwrap();
        comp.connect_device(VirtualDevice::pointer("mouse2", "Virtual Mouse 2"), "aux")
            .unwrap();
        comp.disconnect_device(&"mouse2".into()).unwrap();
        comp.create_window("game", "Fullscreen Game", 0, 0, 1920, 1080)
            .unwrap();
        let seat0 = comp.seat_id("seat0").unwrap();
        comp.request_grab("game", seat0, GrabMode::PointerLock).unwrap();
        comp.move_pointer_to(&"mouse1".into(), 100.4, 99.6).unwrap();

        // Act
        let text = comp.get_state_summary().to_string();

        // Assert
        assert_eq!(
            text,
            "=== Simulation State ===\n\
             \n\
             Seats:\n  \
             seat0: cursor at (0, 0) [POINTER GRABBED]\n  \
             aux: cursor at (0, 0)\n\
             \n\
             Devices:\n  \
             Virtual Mouse 1: connected, assigned to seat0\n  \
             Virtual Mouse 2: disconnected, assigned to (unassigned)\n\
             \n\
             Windows:\n  \
             Fullscreen Game: (0, 0) 1920x1080 [GRAB: POINTER_LOCK]"
        );
    }

    #[test]
    fn test_summary_serializes_for_json_output() {
        let mut comp = VirtualCompositor::new(640, 480);
        comp.create_window("term", "Terminal", 10, 20, 300, 200).unwrap();

        let json = serde_json::to_value(comp.get_state_summary()).unwrap();

        assert_eq!(json["display"]["width"], 640);
        assert_eq!(json["windows"][0]["rect"]["y"], 20);
        assert_eq!(json["seats"][0]["name"], "seat0");
        assert!(json["windows"][0]["grab"].is_null());
    }
}
