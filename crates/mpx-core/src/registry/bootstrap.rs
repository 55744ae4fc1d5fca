//! Building a [`SeatManager`] from configuration documents and back.

use tracing::{info, warn};

use super::manager::{HotplugPolicy, ManagerOptions, SeatManager, UsbSeatRule};
use crate::config::{
    ConfigError, DeviceMapDocument, DeviceMapping, GlobalConfig, SeatConfigDocument, SeatEntry,
    CONFIG_VERSION,
};
use crate::domain::device::{Device, DeviceId};

/// What [`SeatManager::from_config`] did with the documents it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub seats_created: usize,
    pub devices_registered: usize,
    pub devices_assigned: usize,
    /// `vvvv:pppp` mappings kept as hot-plug rules.
    pub usb_rules: usize,
    /// Device ids whose mapping lost to a higher-priority one.
    pub skipped_mappings: Vec<String>,
}

impl SeatManager {
    /// Builds a registry from a seat configuration and a device map.
    ///
    /// Seats are created first, in document order; then mappings are applied
    /// highest priority first.  A second mapping for an already-registered
    /// device id is skipped and listed in the report.  A mapping that names a
    /// seat absent from the configuration fails the whole call.
    ///
    /// Mappings keyed by a `vvvv:pppp` USB identifier become
    /// [`UsbSeatRule`]s consulted by [`SeatManager::hotplug_device`].
    pub fn from_config(
        config: &SeatConfigDocument,
        devices: &DeviceMapDocument,
    ) -> Result<(SeatManager, ApplyReport), ConfigError> {
        config.validate()?;
        devices.validate()?;

        let global = &config.global_config;
        let mut manager = SeatManager::with_options(ManagerOptions {
            default_seat_name: global.default_seat.clone(),
            hotplug_policy: global.effective_hotplug_policy(),
            display_bounds: None,
        });
        let mut report = ApplyReport::default();

        for entry in &config.seats {
            let seat_id = if entry.name == global.default_seat {
                manager.default_seat_id()
            } else {
                report.seats_created += 1;
                manager.create_seat(entry.name.clone())?
            };
            let theme = entry.cursor_theme.clone();
            manager.set_cursor_appearance(seat_id, entry.cursor_size, theme)?;
            manager.set_seat_enabled(seat_id, entry.enabled)?;
        }

        for mapping in devices.by_priority() {
            if mapping.is_usb_rule() {
                if let Some(seat_name) = &mapping.seat_name {
                    manager.get_seat_by_name(seat_name)?;
                }
                let added = manager.add_usb_rule(UsbSeatRule {
                    usb_id: mapping.device_id.clone(),
                    seat_name: mapping.seat_name.clone(),
                    priority: mapping.priority,
                });
                if added {
                    report.usb_rules += 1;
                } else {
                    warn!(usb_id = %mapping.device_id, "duplicate usb seat rule skipped");
                    report.skipped_mappings.push(mapping.device_id.clone());
                }
                continue;
            }

            let device_id = DeviceId::new(mapping.device_id.as_str());
            if manager.get_device(&device_id).is_ok() {
                warn!(
                    device = %device_id,
                    priority = mapping.priority,
                    "duplicate device mapping skipped"
                );
                report.skipped_mappings.push(mapping.device_id.clone());
                continue;
            }

            let name = if mapping.device_name.is_empty() {
                mapping.device_id.clone()
            } else {
                mapping.device_name.clone()
            };
            let seat_id = match &mapping.seat_name {
                Some(seat_name) => Some(manager.get_seat_by_name(seat_name)?.id()),
                None => None,
            };

            let mut device = Device::new(device_id.clone(), name, mapping.kind);
            if let Some((vendor, product)) = mapping.usb_ids() {
                device = device.with_usb_ids(vendor, product);
            }
            manager.register_device(device)?;
            report.devices_registered += 1;
            if let Some(seat_id) = seat_id {
                manager.assign_device(&device_id, seat_id)?;
                report.devices_assigned += 1;
            }
        }

        info!(
            seats = manager.seat_count(),
            devices = manager.device_count(),
            usb_rules = report.usb_rules,
            skipped = report.skipped_mappings.len(),
            "registry built from configuration"
        );
        Ok((manager, report))
    }

    /// Serializable documents describing the current seats and devices.
    ///
    /// Feeding the result back into [`SeatManager::from_config`] reproduces
    /// the same seats, names, enabled flags and assignments.
    pub fn export_config(&self) -> (SeatConfigDocument, DeviceMapDocument) {
        let policy = self.hotplug_policy();
        let config = SeatConfigDocument {
            version: CONFIG_VERSION,
            global_config: GlobalConfig {
                auto_assign_new_devices: policy != HotplugPolicy::Unassigned,
                default_seat: self.default_seat().name().to_string(),
                hotplug_policy: Some(policy),
            },
            seats: self
                .list_seats()
                .map(|seat| SeatEntry {
                    name: seat.name().to_string(),
                    enabled: seat.is_enabled(),
                    cursor_size: seat.cursor_size(),
                    cursor_theme: seat.cursor_theme().map(str::to_string),
                })
                .collect(),
        };

        let device_mappings = self.list_devices().map(|device| DeviceMapping {
            device_id: device.id().to_string(),
            seat_name: self
                .seat_for_device(device.id())
                .map(|seat| seat.name().to_string()),
            device_name: device.name().to_string(),
            priority: 0,
            kind: device.kind(),
            usb_id: device.has_usb_ids().then(|| device.usb_identifier()),
        });
        let rule_mappings = self.usb_rules().iter().map(|rule| DeviceMapping {
            device_id: rule.usb_id.clone(),
            seat_name: rule.seat_name.clone(),
            priority: rule.priority,
            ..DeviceMapping::default()
        });
        let devices = DeviceMapDocument {
            version: CONFIG_VERSION,
            mappings: device_mappings.chain(rule_mappings).collect(),
        };

        (config, devices)
    }
}
