//! Integration tests: controller commands against a real on-disk store.
//!
//! Every test works in its own scratch directory under the system temp dir,
//! named with a fresh UUID so parallel test threads never share files.

use std::fs;
use std::path::PathBuf;

use mpx_core::{Device, DeviceKind, HotplugPolicy};
use mpx_ctl::{ConfigStore, CtlError, SeatController, StoreError};

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("mpx-ctl-it-{}", uuid::Uuid::new_v4())))
    }

    fn store(&self) -> ConfigStore {
        ConfigStore::new(self.0.clone())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn open(dir: &ScratchDir) -> SeatController<ConfigStore> {
    SeatController::open(dir.store()).expect("stored configuration must load")
}

#[test]
fn test_first_run_has_only_the_default_seat_and_writes_nothing() {
    // Arrange
    let dir = ScratchDir::new();

    // Act
    let controller = open(&dir);

    // Assert
    let seats = controller.list_seats();
    assert_eq!(seats.len(), 1);
    assert_eq!(seats[0].name, "seat0");
    assert!(controller.list_devices().is_empty());
    assert!(!dir.0.exists());
}

#[test]
fn test_changes_persist_across_invocations() {
    // Arrange
    let dir = ScratchDir::new();

    // Act: three separate invocations
    open(&dir).create_seat("aux").unwrap();
    open(&dir)
        .register_device(Device::new("mouse2", "USB Mouse", DeviceKind::Pointer))
        .unwrap();
    open(&dir).assign_device("mouse2", "aux").unwrap();

    // Assert
    let controller = open(&dir);
    let status = controller.status();
    assert_eq!(status.seats.len(), 2);
    let mouse = &status.devices[0];
    assert_eq!(mouse.name, "USB Mouse");
    assert_eq!(mouse.seat.as_deref(), Some("aux"));

    let stored = fs::read_to_string(dir.store().devices_path()).unwrap();
    assert!(stored.contains("\"seat_name\": \"aux\""));
}

#[test]
fn test_seat_with_devices_cannot_be_destroyed_until_emptied() {
    // Arrange
    let dir = ScratchDir::new();
    open(&dir).create_seat("aux").unwrap();
    open(&dir)
        .register_device(Device::new("kbd", "Keyboard", DeviceKind::Keyboard))
        .unwrap();
    open(&dir).assign_device("kbd", "aux").unwrap();

    // Act
    let refused = open(&dir).destroy_seat("aux").unwrap_err();
    let previous = open(&dir).unassign_device("kbd").unwrap();
    open(&dir).destroy_seat("aux").unwrap();

    // Assert
    assert_eq!(refused.kind(), "SeatInUseError");
    assert_eq!(previous.as_deref(), Some("aux"));
    let controller = open(&dir);
    assert_eq!(controller.list_seats().len(), 1);
    assert_eq!(controller.list_devices()[0].seat, None);
}

#[test]
fn test_unassigned_policy_leaves_registered_devices_unassigned() {
    // Arrange
    let dir = ScratchDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(
        dir.store().config_path(),
        r#"{"version": 1,
            "global_config": {"auto_assign_new_devices": false, "default_seat": "seat0"},
            "seats": []}"#,
    )
    .unwrap();

    // Act
    let seat = open(&dir)
        .register_device(Device::new("pad", "Touchpad", DeviceKind::Touch))
        .unwrap();

    // Assert
    assert_eq!(seat, None);
    let controller = open(&dir);
    assert_eq!(controller.status().hotplug_policy, HotplugPolicy::Unassigned);
    assert_eq!(controller.status().unassigned_devices(), 1);
}

#[test]
fn test_mapping_to_unknown_seat_fails_to_open() {
    let dir = ScratchDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(
        dir.store().devices_path(),
        r#"{"version": 1, "mappings": [{"device_id": "m", "seat_name": "ghost"}]}"#,
    )
    .unwrap();

    let err = SeatController::open(dir.store()).err().unwrap();

    assert_eq!(err.kind(), "UnknownSeatError");
}

#[test]
fn test_unknown_field_in_config_is_a_store_error() {
    let dir = ScratchDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(
        dir.store().config_path(),
        r#"{"version": 1, "global_config": {"verbose": true}}"#,
    )
    .unwrap();

    let err = SeatController::open(dir.store()).err().unwrap();

    assert!(matches!(err, CtlError::Store(StoreError::Parse { .. })));
    assert_eq!(err.kind(), "StoreError");
}

#[test]
fn test_unsupported_version_is_a_config_error() {
    let dir = ScratchDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(dir.store().devices_path(), r#"{"version": 2, "mappings": []}"#).unwrap();

    let err = SeatController::open(dir.store()).err().unwrap();

    assert_eq!(err.kind(), "ConfigError");
    assert!(err.to_string().contains("version 2"));
}

#[test]
fn test_usb_ids_persist_and_usb_rule_places_new_device() {
    // Arrange: an "aux" seat plus a rule sending 046d:c077 devices to it
    let dir = ScratchDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(
        dir.store().config_path(),
        r#"{"version": 1, "seats": [{"name": "seat0"}, {"name": "aux"}]}"#,
    )
    .unwrap();
    fs::write(
        dir.store().devices_path(),
        r#"{"version": 1, "mappings": [{"device_id": "046d:c077", "seat_name": "aux"}]}"#,
    )
    .unwrap();

    // Act
    let ruled = open(&dir)
        .register_device(
            Device::new("logi", "Logitech", DeviceKind::Pointer).with_usb_ids(0x046d, 0xc077),
        )
        .unwrap();
    let other = open(&dir)
        .register_device(Device::new("generic", "Generic", DeviceKind::Pointer))
        .unwrap();

    // Assert
    assert_eq!(ruled.as_deref(), Some("aux"));
    assert_eq!(other.as_deref(), Some("seat0"));
    let controller = open(&dir);
    assert_eq!(controller.apply_report().usb_rules, 1);
    let devices = controller.list_devices();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].usb_id.as_deref(), Some("046d:c077"));
    assert_eq!(devices[1].usb_id, None);
}
