//! Seat records.
//!
//! A seat (the `wl_seat` concept) is one operator's independent bundle of
//! cursor, focus and grab state together with the devices that feed it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::device::{Capabilities, DeviceId};
use super::geometry::Position;
use super::grab::Grab;

/// Cursor size used when no configuration says otherwise.
pub const DEFAULT_CURSOR_SIZE: u32 = 24;

/// Generated seat identifier.
///
/// Ids come from a per-manager counter and are never reused while that
/// manager lives, so a stale id can only ever miss, never alias a newer seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub(crate) u32);

impl SeatId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat-{}", self.0)
    }
}

/// Opaque reference to a focusable surface owned by the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WindowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A logical seat.
///
/// Every field is private to the crate: the [`SeatManager`] is the only
/// writer, and each of its mutating operations touches exactly one seat.
///
/// [`SeatManager`]: crate::registry::SeatManager
#[derive(Debug, Clone)]
pub struct Seat {
    pub(crate) id: SeatId,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) cursor: Position,
    pub(crate) cursor_size: u32,
    pub(crate) cursor_theme: Option<String>,
    pub(crate) pointer_focus: Option<WindowId>,
    pub(crate) keyboard_focus: Option<WindowId>,
    pub(crate) pointer_grab: Option<Grab>,
    pub(crate) devices: BTreeSet<DeviceId>,
    pub(crate) pointer_devices: BTreeSet<DeviceId>,
    pub(crate) keyboard_devices: BTreeSet<DeviceId>,
}

impl Seat {
    pub(crate) fn new(id: SeatId, name: String) -> Self {
        Self {
            id,
            name,
            enabled: true,
            cursor: Position::default(),
            cursor_size: DEFAULT_CURSOR_SIZE,
            cursor_theme: None,
            pointer_focus: None,
            keyboard_focus: None,
            pointer_grab: None,
            devices: BTreeSet::new(),
            pointer_devices: BTreeSet::new(),
            keyboard_devices: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn cursor_size(&self) -> u32 {
        self.cursor_size
    }

    pub fn cursor_theme(&self) -> Option<&str> {
        self.cursor_theme.as_deref()
    }

    pub fn pointer_focus(&self) -> Option<&WindowId> {
        self.pointer_focus.as_ref()
    }

    pub fn keyboard_focus(&self) -> Option<&WindowId> {
        self.keyboard_focus.as_ref()
    }

    pub fn pointer_grab(&self) -> Option<&Grab> {
        self.pointer_grab.as_ref()
    }

    pub fn is_pointer_grabbed(&self) -> bool {
        self.pointer_grab.is_some()
    }

    /// All devices assigned to this seat.
    pub fn devices(&self) -> &BTreeSet<DeviceId> {
        &self.devices
    }

    pub fn has_device(&self, id: &DeviceId) -> bool {
        self.devices.contains(id)
    }

    /// Assigned devices with the pointer capability.
    pub fn pointer_devices(&self) -> &BTreeSet<DeviceId> {
        &self.pointer_devices
    }

    /// Assigned devices with the keyboard capability.
    pub fn keyboard_devices(&self) -> &BTreeSet<DeviceId> {
        &self.keyboard_devices
    }

    pub fn has_pointer(&self) -> bool {
        !self.pointer_devices.is_empty()
    }

    pub fn has_keyboard(&self) -> bool {
        !self.keyboard_devices.is_empty()
    }

    /// `true` when the seat has at least one pointer and one keyboard.
    pub fn is_complete(&self) -> bool {
        self.has_pointer() && self.has_keyboard()
    }

    /// Indexes a device under every role its capabilities allow.
    pub(crate) fn attach_device(&mut self, id: &DeviceId, capabilities: Capabilities) {
        self.devices.insert(id.clone());
        if capabilities.contains(Capabilities::POINTER) {
            self.pointer_devices.insert(id.clone());
        }
        if capabilities.contains(Capabilities::KEYBOARD) {
            self.keyboard_devices.insert(id.clone());
        }
    }

    pub(crate) fn detach_device(&mut self, id: &DeviceId) {
        self.devices.remove(id);
        self.pointer_devices.remove(id);
        self.keyboard_devices.remove(id);
    }
}

impl PartialEq for Seat {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Seat {}
