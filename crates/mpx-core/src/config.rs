//! Persistent configuration documents.
//!
//! Two JSON documents describe a multi-seat setup:
//!
//! - `config.json` ([`SeatConfigDocument`]) – global options and the seat list.
//! - `devices.json` ([`DeviceMapDocument`]) – which device goes to which seat.
//!   A mapping whose `device_id` is a `vvvv:pppp` USB identifier is a rule
//!   for hot-plugged devices with those ids rather than a device record.
//!
//! Both are parsed into explicit structs that reject unknown fields, so a
//! typo in a key is reported instead of silently ignored.  Missing optional
//! keys fall back to the same defaults a freshly created manager uses.
//!
//! Reading and writing the files is the control tool's job; this module only
//! defines the documents and checks them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    device::{parse_usb_identifier, DeviceKind},
    seat::DEFAULT_CURSOR_SIZE,
};
use crate::registry::{HotplugPolicy, SeatError, DEFAULT_SEAT_NAME};

/// The only document version this crate reads and writes.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("unsupported {document} version {found} (expected {CONFIG_VERSION})")]
    UnsupportedVersion { document: &'static str, found: u32 },

    #[error("invalid {document}: {reason}")]
    Invalid {
        document: &'static str,
        reason: String,
    },

    /// The documents are well-formed but cannot be applied to a registry.
    #[error(transparent)]
    Seat(#[from] SeatError),
}

// ── config.json ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatConfigDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub global_config: GlobalConfig,
    /// An empty list means "default seat only".
    #[serde(default)]
    pub seats: Vec<SeatEntry>,
}

impl Default for SeatConfigDocument {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            global_config: GlobalConfig::default(),
            seats: vec![SeatEntry::new(DEFAULT_SEAT_NAME)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    #[serde(default = "default_true")]
    pub auto_assign_new_devices: bool,
    #[serde(default = "default_seat_name")]
    pub default_seat: String,
    /// Overrides `auto_assign_new_devices` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotplug_policy: Option<HotplugPolicy>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            auto_assign_new_devices: true,
            default_seat: default_seat_name(),
            hotplug_policy: None,
        }
    }
}

impl GlobalConfig {
    /// The hot-plug policy in force, derived from the legacy boolean when no
    /// explicit policy is configured.
    pub fn effective_hotplug_policy(&self) -> HotplugPolicy {
        match self.hotplug_policy {
            Some(policy) => policy,
            None if self.auto_assign_new_devices => HotplugPolicy::DefaultSeat,
            None => HotplugPolicy::Unassigned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatEntry {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cursor_size")]
    pub cursor_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_theme: Option<String>,
}

impl SeatEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            cursor_size: DEFAULT_CURSOR_SIZE,
            cursor_theme: None,
        }
    }
}

impl SeatConfigDocument {
    /// Checks version and seat-name rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const DOCUMENT: &str = "seat configuration";
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                document: DOCUMENT,
                found: self.version,
            });
        }
        if self.global_config.default_seat.trim().is_empty() {
            return Err(invalid(DOCUMENT, "default_seat must not be empty"));
        }

        let mut seen = std::collections::HashSet::new();
        for seat in &self.seats {
            if seat.name.trim().is_empty() {
                return Err(invalid(DOCUMENT, "seat names must not be empty"));
            }
            if !seen.insert(seat.name.as_str()) {
                return Err(invalid(
                    DOCUMENT,
                    format!("seat '{}' is listed more than once", seat.name),
                ));
            }
        }
        Ok(())
    }
}

// ── devices.json ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceMapDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub mappings: Vec<DeviceMapping>,
}

impl Default for DeviceMapDocument {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            mappings: Vec::new(),
        }
    }
}

/// One device and the seat it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceMapping {
    pub device_id: String,
    /// `None` keeps the device registered but unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_name: Option<String>,
    #[serde(default)]
    pub device_name: String,
    /// Higher priority mappings are applied first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub kind: DeviceKind,
    /// The device's own `vvvv:pppp` USB identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb_id: Option<String>,
}

impl DeviceMapping {
    /// `true` when `device_id` names a USB vendor/product pair instead of a
    /// single device.
    pub fn is_usb_rule(&self) -> bool {
        parse_usb_identifier(&self.device_id).is_some()
    }

    /// The parsed `usb_id` field.
    pub fn usb_ids(&self) -> Option<(u16, u16)> {
        self.usb_id.as_deref().and_then(parse_usb_identifier)
    }
}

impl DeviceMapDocument {
    pub fn validate(&self) -> Result<(), ConfigError> {
        const DOCUMENT: &str = "device map";
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                document: DOCUMENT,
                found: self.version,
            });
        }
        if self.mappings.iter().any(|m| m.device_id.trim().is_empty()) {
            return Err(invalid(DOCUMENT, "device_id must not be empty"));
        }
        for mapping in &self.mappings {
            if mapping.usb_id.is_some() && mapping.usb_ids().is_none() {
                return Err(invalid(
                    DOCUMENT,
                    format!(
                        "usb_id of '{}' must have the form vvvv:pppp",
                        mapping.device_id
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Mappings in application order: highest priority first, file order
    /// among equals.
    pub fn by_priority(&self) -> Vec<&DeviceMapping> {
        let mut ordered: Vec<&DeviceMapping> = self.mappings.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        ordered
    }
}

fn invalid(document: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        document,
        reason: reason.into(),
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn default_seat_name() -> String {
    DEFAULT_SEAT_NAME.to_string()
}

fn default_cursor_size() -> u32 {
    DEFAULT_CURSOR_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_uses_defaults() {
        // Arrange
        let json = r#"{"version":1,"seats":[{"name":"aux"}]}"#;

        // Act
        let doc: SeatConfigDocument = serde_json::from_str(json).unwrap();

        // Assert
        assert!(doc.global_config.auto_assign_new_devices);
        assert_eq!(doc.global_config.default_seat, "seat0");
        assert_eq!(doc.seats[0].cursor_size, 24);
        assert!(doc.seats[0].enabled);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"version":1,"seats":[{"name":"aux","colour":"red"}]}"#;
        let result: Result<SeatConfigDocument, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_hotplug_policy_falls_back_to_auto_assign_flag() {
        let mut global = GlobalConfig {
            auto_assign_new_devices: false,
            ..GlobalConfig::default()
        };
        assert_eq!(global.effective_hotplug_policy(), HotplugPolicy::Unassigned);

        global.hotplug_policy = Some(HotplugPolicy::NewSeat);
        assert_eq!(global.effective_hotplug_policy(), HotplugPolicy::NewSeat);
    }

    #[test]
    fn test_validate_rejects_wrong_version() {
        let doc = SeatConfigDocument {
            version: 2,
            ..SeatConfigDocument::default()
        };
        assert!(matches!(
            doc.validate(),
            Err(ConfigError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_seat_names() {
        let doc = SeatConfigDocument {
            seats: vec![SeatEntry::new("aux"), SeatEntry::new("aux")],
            ..SeatConfigDocument::default()
        };
        assert!(matches!(doc.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_mapping_kind_defaults_to_pointer() {
        let json = r#"{"version":1,"mappings":[
            {"device_id":"mouse2","seat_name":"aux","device_name":"Logitech"}
        ]}"#;
        let doc: DeviceMapDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.mappings[0].kind, DeviceKind::Pointer);
        assert_eq!(doc.mappings[0].priority, 0);
        assert_eq!(doc.mappings[0].seat_name.as_deref(), Some("aux"));
    }

    #[test]
    fn test_by_priority_is_stable_for_equal_priorities() {
        let mapping = |id: &str, priority| DeviceMapping {
            device_id: id.to_string(),
            seat_name: None,
            device_name: String::new(),
            priority,
            kind: DeviceKind::Pointer,
            usb_id: None,
        };
        let doc = DeviceMapDocument {
            version: 1,
            mappings: vec![mapping("a", 0), mapping("b", 5), mapping("c", 0)],
        };

        let order: Vec<&str> = doc
            .by_priority()
            .iter()
            .map(|m| m.device_id.as_str())
            .collect();

        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_usb_rules_are_recognised_by_device_id() {
        let json = r#"{"version":1,"mappings":[
            {"device_id":"046d:c077","seat_name":"aux"},
            {"device_id":"mouse2","usb_id":"046d:c077"}
        ]}"#;
        let doc: DeviceMapDocument = serde_json::from_str(json).unwrap();

        assert!(doc.validate().is_ok());
        assert!(doc.mappings[0].is_usb_rule());
        assert!(!doc.mappings[1].is_usb_rule());
        assert_eq!(doc.mappings[1].usb_ids(), Some((0x046d, 0xc077)));
    }

    #[test]
    fn test_malformed_usb_id_is_invalid() {
        let doc = DeviceMapDocument {
            version: 1,
            mappings: vec![DeviceMapping {
                device_id: "mouse2".into(),
                usb_id: Some("logitech".into()),
                ..DeviceMapping::default()
            }],
        };

        assert!(matches!(doc.validate(), Err(ConfigError::Invalid { .. })));
    }
}
