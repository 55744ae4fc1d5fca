//! Scriptable stand-ins for physical input devices.

use std::collections::BTreeSet;

use mpx_core::{Capabilities, Device, DeviceId, DeviceKind};

/// A synthetic device the compositor can connect and disconnect at will.
///
/// Besides the registry record it produces, it remembers which buttons and
/// keys are currently held so scenarios can inspect them.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualDevice {
    id: DeviceId,
    name: String,
    kind: DeviceKind,
    capabilities: Capabilities,
    usb_ids: Option<(u16, u16)>,
    pub(crate) connected: bool,
    pub(crate) buttons_pressed: BTreeSet<u32>,
    pub(crate) keys_pressed: BTreeSet<u32>,
}

impl VirtualDevice {
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            capabilities: kind.default_capabilities(),
            usb_ids: None,
            connected: false,
            buttons_pressed: BTreeSet::new(),
            keys_pressed: BTreeSet::new(),
        }
    }

    pub fn pointer(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self::new(id, name, DeviceKind::Pointer)
    }

    pub fn keyboard(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self::new(id, name, DeviceKind::Keyboard)
    }

    /// Gives the device USB vendor/product ids, reported in its registry
    /// record.
    pub fn with_usb_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.usb_ids = Some((vendor_id, product_id));
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

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn buttons_pressed(&self) -> &BTreeSet<u32> {
        &self.buttons_pressed
    }

    pub fn keys_pressed(&self) -> &BTreeSet<u32> {
        &self.keys_pressed
    }

    /// The registry record for this device.
    pub fn to_device(&self) -> Device {
        let device = Device::new(self.id.clone(), self.name.clone(), self.kind)
            .with_capabilities(self.capabilities)
            .with_available(self.connected);
        match self.usb_ids {
            Some((vendor, product)) => device.with_usb_ids(vendor, product),
            None => device,
        }
    }

    pub(crate) fn record_button(&mut self, button: u32, pressed: bool) {
        if pressed {
            self.buttons_pressed.insert(button);
        } else {
            self.buttons_pressed.remove(&button);
        }
    }

    pub(crate) fn record_key(&mut self, key: u32, pressed: bool) {
        if pressed {
            self.keys_pressed.insert(key);
        } else {
            self.keys_pressed.remove(&key);
        }
    }
}

/// Two mice and two keyboards, the usual cast for a two-seat scenario.
pub fn standard_devices() -> Vec<VirtualDevice> {
    vec![
        VirtualDevice::pointer("mouse1", "Virtual Mouse 1"),
        VirtualDevice::pointer("mouse2", "Virtual Mouse 2"),
        VirtualDevice::keyboard("keyboard1", "Virtual Keyboard 1"),
        VirtualDevice::keyboard("keyboard2", "Virtual Keyboard 2"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_sets_track_press_and_release() {
        let mut device = VirtualDevice::keyboard("kbd", "Keyboard");

        device.record_key(30, true);
        device.record_key(31, true);
        device.record_key(30, false);

        assert_eq!(device.keys_pressed().iter().copied().collect::<Vec<_>>(), vec![31]);
    }

    #[test]
    fn test_to_device_carries_kind_capabilities() {
        let device = VirtualDevice::new("combo", "Combo", DeviceKind::Combo).to_device();
        assert!(device.has_capability(Capabilities::POINTER | Capabilities::KEYBOARD));
        assert!(!device.is_assigned());
    }

    #[test]
    fn test_to_device_carries_usb_ids() {
        let plain = VirtualDevice::pointer("m", "Mouse").to_device();
        let usb = VirtualDevice::pointer("logi", "Logitech")
            .with_usb_ids(0x046d, 0xc077)
            .to_device();

        assert!(!plain.has_usb_ids());
        assert_eq!(usb.usb_identifier(), "046d:c077");
    }
}
