//! Physical input device records.
//!
//! A [`Device`] mirrors what a device-capture layer (libinput, evdev) reports
//! for one physical mouse, keyboard or touch panel. The record is created by
//! the caller and handed to
//! [`SeatManager::register_device`](crate::registry::SeatManager::register_device);
//! from then on only the manager writes its seat assignment.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::seat::SeatId;

/// Caller-supplied, globally unique device identifier (e.g. a sysfs path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

bitflags! {
    /// Input capabilities a device offers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const POINTER = 1;
        const KEYBOARD = 1 << 1;
        const TOUCH = 1 << 2;
    }
}

impl Capabilities {
    /// Lower-case capability names, e.g. `["pointer", "keyboard"]`.
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

/// The primary kind of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Mouse, trackpad, trackball.
    #[default]
    Pointer,
    Keyboard,
    Touch,
    /// A single device exposing both pointer and keyboard interfaces.
    Combo,
}

impl DeviceKind {
    /// The capability set a device of this kind has unless told otherwise.
    pub fn default_capabilities(self) -> Capabilities {
        match self {
            DeviceKind::Pointer => Capabilities::POINTER,
            DeviceKind::Keyboard => Capabilities::KEYBOARD,
            DeviceKind::Touch => Capabilities::TOUCH,
            DeviceKind::Combo => Capabilities::POINTER | Capabilities::KEYBOARD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Pointer => "pointer",
            DeviceKind::Keyboard => "keyboard",
            DeviceKind::Touch => "touch",
            DeviceKind::Combo => "combo",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a device kind string is not recognised.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown device kind '{0}' (expected pointer, keyboard, touch or combo)")]
pub struct ParseDeviceKindError(pub String);

impl FromStr for DeviceKind {
    type Err = ParseDeviceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pointer" | "mouse" => Ok(DeviceKind::Pointer),
            "keyboard" => Ok(DeviceKind::Keyboard),
            "touch" => Ok(DeviceKind::Touch),
            "combo" | "both" => Ok(DeviceKind::Combo),
            other => Err(ParseDeviceKindError(other.to_string())),
        }
    }
}

/// A physical input device.
///
/// Identity is the [`DeviceId`]: two records with the same id compare equal
/// regardless of their other fields.
#[derive(Debug, Clone)]
pub struct Device {
    id: DeviceId,
    name: String,
    kind: DeviceKind,
    capabilities: Capabilities,
    vendor_id: u16,
    product_id: u16,
    available: bool,
    pub(crate) seat: Option<SeatId>,
}

impl Device {
    /// Creates an unassigned device whose capabilities follow from `kind`.
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            capabilities: kind.default_capabilities(),
            vendor_id: 0,
            product_id: 0,
            available: true,
            seat: None,
        }
    }

    /// Overrides the capability set derived from the kind.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the USB vendor and product ids that `vvvv:pppp` seat rules
    /// match against.
    pub fn with_usb_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn has_capability(&self, cap: Capabilities) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// The seat currently routing this device's events.
    pub fn seat(&self) -> Option<SeatId> {
        self.seat
    }

    pub fn is_assigned(&self) -> bool {
        self.seat.is_some()
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// `false` for devices created without USB ids (both zero).
    pub fn has_usb_ids(&self) -> bool {
        self.vendor_id != 0 || self.product_id != 0
    }

    /// USB identifier in `vvvv:pppp` form, as used by device mapping files.
    pub fn usb_identifier(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// Checks the structural invariants of a freshly built record.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("device id must not be empty".to_string());
        }
        if self.capabilities.is_empty() {
            return Err("capability set must not be empty".to_string());
        }
        Ok(())
    }
}

/// Parses a `vvvv:pppp` USB identifier (four hex digits each side).
///
/// Returns `None` for anything else, including plain device ids.
pub fn parse_usb_identifier(s: &str) -> Option<(u16, u16)> {
    let (vendor, product) = s.split_once(':')?;
    let hex4 = |part: &str| {
        if part.len() == 4 && part.chars().all(|c| c.is_ascii_hexdigit()) {
            u16::from_str_radix(part, 16).ok()
        } else {
            None
        }
    };
    Some((hex4(vendor)?, hex4(product)?))
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Device {}
