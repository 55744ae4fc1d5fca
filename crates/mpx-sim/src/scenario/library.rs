//! Built-in scenarios, runnable by name from the control CLI.

use mpx_core::{ErrorKind, GrabMode, Rect};

use super::{Expectation, Scenario, Step};
use crate::virtual_device::VirtualDevice;

/// Two pointers on two seats move two independent cursors.
pub fn basic_dual_pointer() -> Scenario {
    Scenario::new(
        "basic_dual_pointer",
        "Two mice on two seats move independent cursors",
        vec![
            Step::create_seat("aux"),
            Step::connect(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0"),
            Step::connect(VirtualDevice::pointer("mouse2", "Virtual Mouse 2"), "aux"),
            Step::Expect(Expectation::SeatCount(2)),
            Step::move_to("mouse1", 100.0, 100.0),
            Step::move_to("mouse2", 500.0, 500.0),
            Step::expect_cursor("seat0", 100.0, 100.0),
            Step::expect_cursor("aux", 500.0, 500.0),
            Step::move_by("mouse1", 50.0, 0.0),
            Step::expect_cursor("seat0", 150.0, 100.0),
            Step::expect_cursor("aux", 500.0, 500.0),
        ],
    )
}

/// A lock on one seat leaves the other seat free.
pub fn grab_isolation() -> Scenario {
    Scenario::new(
        "grab_isolation",
        "A pointer lock on seat0 does not affect aux",
        vec![
            Step::create_seat("aux"),
            Step::connect(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0"),
            Step::connect(VirtualDevice::pointer("mouse2", "Virtual Mouse 2"), "aux"),
            Step::window("game", "Game", 0, 0, 1920, 1080),
            Step::grab("game", "seat0", GrabMode::PointerLock),
            Step::expect_grabbed("seat0", true),
            Step::expect_grabbed("aux", false),
            Step::move_to("mouse2", 960.0, 540.0),
            Step::expect_cursor("aux", 960.0, 540.0),
            Step::expect_fails(
                Step::grab("launcher", "seat0", GrabMode::PointerConfine),
                ErrorKind::AlreadyGrabbedError,
            ),
            Step::grab("game", "aux", GrabMode::PointerConfine),
            Step::expect_grabbed("aux", true),
            Step::DestroyWindow { id: "game".into() },
            Step::expect_grabbed("seat0", false),
            Step::expect_grabbed("aux", false),
        ],
    )
}

/// Devices come and go; a disconnected device routes nowhere.
pub fn device_hotplug() -> Scenario {
    let hotplug = || VirtualDevice::pointer("mouse_hotplug", "Hotplug Mouse");
    Scenario::new(
        "device_hotplug",
        "A device is connected, disconnected and reconnected",
        vec![
            Step::create_seat("aux"),
            Step::connect(hotplug(), "seat0"),
            Step::Expect(Expectation::DeviceConnected {
                device: "mouse_hotplug".into(),
                connected: true,
            }),
            Step::Expect(Expectation::DeviceSeat {
                device: "mouse_hotplug".into(),
                seat: Some("seat0".into()),
            }),
            Step::DisconnectDevice {
                device: "mouse_hotplug".into(),
            },
            Step::Expect(Expectation::DeviceConnected {
                device: "mouse_hotplug".into(),
                connected: false,
            }),
            Step::Expect(Expectation::DeviceSeat {
                device: "mouse_hotplug".into(),
                seat: None,
            }),
            Step::expect_fails(
                Step::move_by("mouse_hotplug", 5.0, 5.0),
                ErrorKind::UnknownDeviceError,
            ),
            Step::connect(hotplug(), "aux"),
            Step::Expect(Expectation::DeviceSeat {
                device: "mouse_hotplug".into(),
                seat: Some("aux".into()),
            }),
            Step::move_by("mouse_hotplug", 5.0, 5.0),
            Step::expect_cursor("aux", 5.0, 5.0),
        ],
    )
}

/// Motion under a pointer lock leaves the cursor where it was.
pub fn lock_freezes_cursor() -> Scenario {
    Scenario::new(
        "lock_freezes_cursor",
        "The cursor stays put while locked and moves again after release",
        vec![
            Step::connect(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0"),
            Step::move_to("mouse1", 300.0, 300.0),
            Step::grab("game", "seat0", GrabMode::PointerLock),
            Step::move_by("mouse1", 500.0, -200.0),
            Step::move_by("mouse1", -80.0, 40.0),
            Step::expect_cursor("seat0", 300.0, 300.0),
            Step::Release {
                seat: "seat0".into(),
            },
            Step::expect_grabbed("seat0", false),
            Step::move_by("mouse1", 10.0, 10.0),
            Step::expect_cursor("seat0", 310.0, 310.0),
        ],
    )
}

/// A confine keeps the cursor inside its region.
pub fn confine_clamps_cursor() -> Scenario {
    let region = Rect::new(100, 100, 400, 300);
    Scenario::new(
        "confine_clamps_cursor",
        "A confined cursor cannot leave its region",
        vec![
            Step::connect(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0"),
            Step::window("editor", "Editor", 100, 100, 400, 300),
            Step::move_to("mouse1", 200.0, 200.0),
            Step::Confine {
                client: "editor".into(),
                seat: "seat0".into(),
                region,
            },
            Step::move_by("mouse1", 1000.0, 1000.0),
            Step::expect_cursor("seat0", 499.0, 399.0),
            Step::move_by("mouse1", -5000.0, 0.0),
            Step::expect_cursor("seat0", 100.0, 399.0),
            Step::DisconnectClient {
                client: "editor".into(),
            },
            Step::move_by("mouse1", 5000.0, 5000.0),
            Step::expect_cursor("seat0", 1919.0, 1079.0),
        ],
    )
}

/// Each seat tracks its own pointer and keyboard focus.
pub fn focus_follows_pointer() -> Scenario {
    let pointer_focus = |seat: &str, window: Option<&str>| {
        Step::Expect(Expectation::PointerFocus {
            seat: seat.into(),
            window: window.map(String::from),
        })
    };
    let keyboard_focus = |seat: &str, window: Option<&str>| {
        Step::Expect(Expectation::KeyboardFocus {
            seat: seat.into(),
            window: window.map(String::from),
        })
    };

    Scenario::new(
        "focus_follows_pointer",
        "Pointer focus follows each cursor; a click moves that seat's keyboard focus",
        vec![
            Step::create_seat("aux"),
            Step::connect(VirtualDevice::pointer("mouse1", "Virtual Mouse 1"), "seat0"),
            Step::connect(VirtualDevice::pointer("mouse2", "Virtual Mouse 2"), "aux"),
            Step::connect(VirtualDevice::keyboard("keyboard1", "Virtual Keyboard 1"), "seat0"),
            Step::connect(VirtualDevice::keyboard("keyboard2", "Virtual Keyboard 2"), "aux"),
            Step::window("term", "Terminal", 0, 0, 800, 600),
            Step::window("web", "Browser", 1000, 0, 800, 600),
            Step::move_to("mouse1", 100.0, 100.0),
            Step::move_to("mouse2", 1100.0, 100.0),
            pointer_focus("seat0", Some("term")),
            pointer_focus("aux", Some("web")),
            Step::click("mouse2"),
            keyboard_focus("aux", Some("web")),
            keyboard_focus("seat0", None),
            Step::Key {
                device: "keyboard2".into(),
                key: 30,
                pressed: true,
            },
            Step::move_to("mouse1", 900.0, 100.0),
            pointer_focus("seat0", None),
            keyboard_focus("aux", Some("web")),
        ],
    )
}

pub fn all() -> Vec<Scenario> {
    vec![
        basic_dual_pointer(),
        grab_isolation(),
        device_hotplug(),
        lock_freezes_cursor(),
        confine_clamps_cursor(),
        focus_follows_pointer(),
    ]
}

pub fn by_name(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        let scenarios = all();
        for scenario in &scenarios {
            assert_eq!(by_name(&scenario.name).as_ref(), Some(scenario));
        }
        let mut names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        names.dedup();
        assert_eq!(names.len(), scenarios.len());
        assert!(by_name("nope").is_none());
    }
}
