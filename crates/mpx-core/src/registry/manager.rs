//! `SeatManager`: the authoritative registry of seats, devices and grabs.
//!
//! # How routing works (for beginners)
//!
//! Every input event arrives tagged with the id of the physical device that
//! produced it.  The manager looks the device up, finds the seat it is
//! assigned to, and applies the event to *that seat only*:
//!
//! ```text
//! mouse2 ──► device table ──► seat "aux" ──► aux.cursor += (dx, dy)
//!                                        └─► seat0 untouched
//! ```
//!
//! Each seat keeps its own cursor, focus and pointer grab, so a game holding
//! a pointer lock on `seat0` never freezes the cursor of `aux`.
//!
//! # Atomicity
//!
//! All operations take `&mut self` and validate every input before mutating
//! anything.  A failed call leaves the registry exactly as it was.  Callers
//! that share a manager across tasks wrap it in a `Mutex` (see the input pump
//! in `mpx-sim`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SeatError;
use super::events::{FocusKind, ListenerId, SeatEvent, SeatEventListener};
use crate::domain::{
    device::{Device, DeviceId},
    geometry::{Position, Rect},
    grab::{ClientId, Grab, GrabMode},
    seat::{Seat, SeatId, WindowId},
};

/// Name of the seat every manager starts with unless configured otherwise.
pub const DEFAULT_SEAT_NAME: &str = "seat0";

/// What happens to a device that appears at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotplugPolicy {
    /// Assign to the default seat.
    #[default]
    DefaultSeat,
    /// Create a fresh seat named after the device.
    NewSeat,
    /// Register only; an operator assigns it later.
    Unassigned,
}

impl HotplugPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            HotplugPolicy::DefaultSeat => "default_seat",
            HotplugPolicy::NewSeat => "new_seat",
            HotplugPolicy::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for HotplugPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-time settings for a [`SeatManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerOptions {
    pub default_seat_name: String,
    pub hotplug_policy: HotplugPolicy,
    /// When set, unconstrained cursors are clamped into this rectangle.
    pub display_bounds: Option<Rect>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            default_seat_name: DEFAULT_SEAT_NAME.to_string(),
            hotplug_policy: HotplugPolicy::default(),
            display_bounds: None,
        }
    }
}

/// Seat placement for hot-plugged devices matched by USB vendor/product
/// rather than by device id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbSeatRule {
    /// Lowercase `vvvv:pppp`.
    pub usb_id: String,
    /// `None` leaves matching devices unassigned.
    pub seat_name: Option<String>,
    pub priority: i32,
}

/// In-memory registry of seats, devices and their grabs.
pub struct SeatManager {
    /// Keyed by id; ids are monotonic so iteration is creation order.
    seats: BTreeMap<SeatId, Seat>,
    devices: HashMap<DeviceId, Device>,
    /// Registration order of `devices`.
    device_order: Vec<DeviceId>,
    default_seat: SeatId,
    next_seat_id: u32,
    hotplug_policy: HotplugPolicy,
    display_bounds: Option<Rect>,
    usb_rules: Vec<UsbSeatRule>,
    listeners: Vec<(ListenerId, Box<dyn SeatEventListener>)>,
    next_listener_id: u64,
}

impl Default for SeatManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SeatManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatManager")
            .field("seats", &self.seats)
            .field("devices", &self.device_order)
            .field("default_seat", &self.default_seat)
            .field("hotplug_policy", &self.hotplug_policy)
            .field("display_bounds", &self.display_bounds)
            .field("usb_rules", &self.usb_rules)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SeatManager {
    /// Creates a manager holding only the default seat `seat0`.
    pub fn new() -> Self {
        Self::with_options(ManagerOptions::default())
    }

    pub fn with_options(options: ManagerOptions) -> Self {
        let default_seat = SeatId(0);
        let mut seats = BTreeMap::new();
        seats.insert(
            default_seat,
            Seat::new(default_seat, options.default_seat_name),
        );
        Self {
            seats,
            devices: HashMap::new(),
            device_order: Vec::new(),
            default_seat,
            next_seat_id: 1,
            hotplug_policy: options.hotplug_policy,
            display_bounds: options.display_bounds,
            usb_rules: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Registers an observer for every subsequent state change.
    pub fn add_listener(&mut self, listener: Box<dyn SeatEventListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Detaches a listener; `false` if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn default_seat_id(&self) -> SeatId {
        self.default_seat
    }

    pub fn default_seat(&self) -> &Seat {
        // The default seat is inserted at construction and destroy_seat
        // refuses to remove it.
        &self.seats[&self.default_seat]
    }

    pub fn hotplug_policy(&self) -> HotplugPolicy {
        self.hotplug_policy
    }

    pub fn display_bounds(&self) -> Option<Rect> {
        self.display_bounds
    }

    pub fn get_seat(&self, seat_id: SeatId) -> Result<&Seat, SeatError> {
        self.seats
            .get(&seat_id)
            .ok_or(SeatError::UnknownSeat(seat_id))
    }

    pub fn get_seat_by_name(&self, name: &str) -> Result<&Seat, SeatError> {
        self.seats
            .values()
            .find(|seat| seat.name == name)
            .ok_or_else(|| SeatError::UnknownSeatName(name.to_string()))
    }

    /// The seat a device currently routes to, if it is known and assigned.
    pub fn seat_for_device(&self, device_id: &DeviceId) -> Option<&Seat> {
        self.devices
            .get(device_id)
            .and_then(|device| device.seat)
            .and_then(|seat_id| self.seats.get(&seat_id))
    }

    pub fn get_device(&self, device_id: &DeviceId) -> Result<&Device, SeatError> {
        self.devices
            .get(device_id)
            .ok_or_else(|| SeatError::UnknownDevice(device_id.clone()))
    }

    /// All seats in creation order, the default seat first.
    pub fn list_seats(&self) -> impl Iterator<Item = &Seat> + '_ {
        self.seats.values()
    }

    /// All devices in registration order.
    pub fn list_devices(&self) -> impl Iterator<Item = &Device> + '_ {
        self.device_order
            .iter()
            .filter_map(|id| self.devices.get(id))
    }

    pub fn unassigned_devices(&self) -> impl Iterator<Item = &Device> + '_ {
        self.list_devices().filter(|device| !device.is_assigned())
    }

    /// Every active grab, one per grabbed seat.
    pub fn active_grabs(&self) -> impl Iterator<Item = &Grab> + '_ {
        self.seats.values().filter_map(|seat| seat.pointer_grab.as_ref())
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    // ── Seat lifecycle ─────────────────────────────────────────────────────

    pub fn create_seat(&mut self, name: impl Into<String>) -> Result<SeatId, SeatError> {
        let name = name.into();
        if self.seats.values().any(|seat| seat.name == name) {
            return Err(SeatError::DuplicateName(name));
        }

        let seat_id = SeatId(self.next_seat_id);
        self.next_seat_id += 1;
        self.seats.insert(seat_id, Seat::new(seat_id, name.clone()));

        info!(seat = %seat_id, name = %name, "seat created");
        self.emit(SeatEvent::SeatCreated {
            seat: seat_id,
            name,
        });
        Ok(seat_id)
    }

    /// Removes a seat that has no devices left.
    ///
    /// The default seat can never be destroyed. Any grab the seat held ends
    /// with it.
    pub fn destroy_seat(&mut self, seat_id: SeatId) -> Result<(), SeatError> {
        let seat = self.get_seat(seat_id)?;
        if seat_id == self.default_seat {
            return Err(SeatError::SeatInUse {
                name: seat.name.clone(),
                reason: "it is the default seat".to_string(),
            });
        }
        if !seat.devices.is_empty() {
            return Err(SeatError::SeatInUse {
                name: seat.name.clone(),
                reason: format!("{} device(s) still assigned", seat.devices.len()),
            });
        }

        if let Some(seat) = self.seats.remove(&seat_id) {
            if let Some(grab) = seat.pointer_grab {
                self.emit(SeatEvent::GrabEnded {
                    seat: seat_id,
                    client: grab.client().clone(),
                });
            }
            info!(seat = %seat_id, name = %seat.name, "seat destroyed");
            self.emit(SeatEvent::SeatDestroyed {
                seat: seat_id,
                name: seat.name,
            });
        }
        Ok(())
    }

    /// Enables or disables routing to a seat.
    pub fn set_seat_enabled(&mut self, seat_id: SeatId, enabled: bool) -> Result<(), SeatError> {
        let seat = self.seat_mut(seat_id)?;
        if seat.enabled == enabled {
            return Ok(());
        }
        seat.enabled = enabled;

        info!(seat = %seat_id, enabled, "seat state changed");
        self.emit(SeatEvent::SeatStateChanged {
            seat: seat_id,
            enabled,
        });
        Ok(())
    }

    /// Sets the cursor size and theme a seat's cursor is drawn with.
    pub fn set_cursor_appearance(
        &mut self,
        seat_id: SeatId,
        size: u32,
        theme: Option<String>,
    ) -> Result<(), SeatError> {
        let seat = self.seat_mut(seat_id)?;
        seat.cursor_size = size;
        seat.cursor_theme = theme;
        Ok(())
    }

    // ── Devices ────────────────────────────────────────────────────────────

    /// Adds a device to the registry, unassigned.
    pub fn register_device(&mut self, mut device: Device) -> Result<(), SeatError> {
        device
            .validate()
            .map_err(|reason| SeatError::InvalidDevice {
                id: device.id().clone(),
                reason,
            })?;
        if self.devices.contains_key(device.id()) {
            return Err(SeatError::DuplicateDevice(device.id().clone()));
        }

        device.seat = None;
        let device_id = device.id().clone();
        info!(device = %device_id, kind = %device.kind(), "device registered");
        self.device_order.push(device_id.clone());
        self.devices.insert(device_id.clone(), device);

        self.emit(SeatEvent::DeviceAdded { device: device_id });
        Ok(())
    }

    /// Removes a device, detaching it from its seat first.
    pub fn unregister_device(&mut self, device_id: &DeviceId) -> Result<Device, SeatError> {
        self.unassign_device(device_id)?;

        let device = self
            .devices
            .remove(device_id)
            .ok_or_else(|| SeatError::UnknownDevice(device_id.clone()))?;
        self.device_order.retain(|id| id != device_id);

        info!(device = %device_id, "device unregistered");
        self.emit(SeatEvent::DeviceRemoved {
            device: device_id.clone(),
        });
        Ok(device)
    }

    /// Moves a device onto `seat_id`, leaving any previous seat in the same
    /// step.
    ///
    /// Assigning a device to the seat it already belongs to is a no-op.
    pub fn assign_device(
        &mut self,
        device_id: &DeviceId,
        seat_id: SeatId,
    ) -> Result<(), SeatError> {
        let device = self.get_device(device_id)?;
        let previous = device.seat;
        let capabilities = device.capabilities();
        self.get_seat(seat_id)?;

        if previous == Some(seat_id) {
            return Ok(());
        }

        if let Some(old) = previous.and_then(|id| self.seats.get_mut(&id)) {
            old.detach_device(device_id);
        }
        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.attach_device(device_id, capabilities);
        }
        if let Some(device) = self.devices.get_mut(device_id) {
            device.seat = Some(seat_id);
        }

        info!(device = %device_id, seat = %seat_id, ?previous, "device assigned");
        self.emit(SeatEvent::DeviceAssigned {
            device: device_id.clone(),
            seat: seat_id,
            previous,
        });
        Ok(())
    }

    /// Detaches a device from its seat, returning the seat it left.
    ///
    /// Already-unassigned devices are left alone and yield `None`.
    pub fn unassign_device(&mut self, device_id: &DeviceId) -> Result<Option<SeatId>, SeatError> {
        let previous = self.get_device(device_id)?.seat;
        let Some(seat_id) = previous else {
            return Ok(None);
        };

        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.detach_device(device_id);
        }
        if let Some(device) = self.devices.get_mut(device_id) {
            device.seat = None;
        }

        info!(device = %device_id, seat = %seat_id, "device unassigned");
        self.emit(SeatEvent::DeviceUnassigned {
            device: device_id.clone(),
            seat: seat_id,
        });
        Ok(Some(seat_id))
    }

    /// Adds a USB seat rule.
    ///
    /// Returns `false`, leaving the existing rule in place, when a rule for
    /// the same identifier is already present.
    pub fn add_usb_rule(&mut self, mut rule: UsbSeatRule) -> bool {
        rule.usb_id.make_ascii_lowercase();
        if self.usb_rules.iter().any(|r| r.usb_id == rule.usb_id) {
            return false;
        }
        debug!(usb_id = %rule.usb_id, seat = ?rule.seat_name, "usb seat rule added");
        self.usb_rules.push(rule);
        true
    }

    pub fn usb_rules(&self) -> &[UsbSeatRule] {
        &self.usb_rules
    }

    /// Registers a device that appeared at runtime and places it.
    ///
    /// A USB seat rule matching the device's vendor/product ids decides the
    /// seat; otherwise the manager's [`HotplugPolicy`] does.  A rule naming a
    /// seat that no longer exists is ignored.
    ///
    /// Returns the seat the device ended up on, if any.
    pub fn hotplug_device(&mut self, device: Device) -> Result<Option<SeatId>, SeatError> {
        let device_id = device.id().clone();
        let ruled = self.usb_rule_seat(&device);
        self.register_device(device)?;

        let target = match ruled {
            Some(seat) => seat,
            None => match self.hotplug_policy {
                HotplugPolicy::DefaultSeat => Some(self.default_seat),
                HotplugPolicy::NewSeat => {
                    let name = self.free_seat_name(device_id.as_str());
                    Some(self.create_seat(name)?)
                }
                HotplugPolicy::Unassigned => None,
            },
        };
        if let Some(seat_id) = target {
            self.assign_device(&device_id, seat_id)?;
        }

        info!(
            device = %device_id,
            policy = %self.hotplug_policy,
            usb_rule = ruled.is_some(),
            seat = ?target,
            "device hot-plugged"
        );
        Ok(target)
    }

    // ── Routing ────────────────────────────────────────────────────────────

    /// Applies relative pointer motion from `device_id` to its seat.
    ///
    /// Under a pointer lock the cursor stays put and the delta is added to
    /// the grab's relative-motion total.  Under a confine the new position is
    /// clamped into the confine region, or the display bounds when the grab
    /// carries no region.
    pub fn route_pointer_motion(
        &mut self,
        device_id: &DeviceId,
        dx: f64,
        dy: f64,
    ) -> Result<SeatId, SeatError> {
        let seat_id = self.routable_seat(device_id)?;
        let bounds = self.display_bounds;
        let seat = self.seat_mut(seat_id)?;

        let event = match grab_constraint(seat.pointer_grab.as_ref()) {
            Some((GrabMode::PointerLock, _)) => {
                if let Some(grab) = seat.pointer_grab.as_mut() {
                    grab.consume_delta(dx, dy);
                }
                debug!(device = %device_id, seat = %seat_id, dx, dy, "locked motion consumed");
                SeatEvent::RelativeMotion {
                    seat: seat_id,
                    device: device_id.clone(),
                    dx,
                    dy,
                }
            }
            constraint => {
                let limit = constraint.and_then(|(_, region)| region).or(bounds);
                seat.cursor = constrain(seat.cursor.offset(dx, dy), limit);
                debug!(
                    device = %device_id,
                    seat = %seat_id,
                    x = seat.cursor.x,
                    y = seat.cursor.y,
                    "pointer motion routed"
                );
                SeatEvent::PointerMotion {
                    seat: seat_id,
                    device: device_id.clone(),
                    dx,
                    dy,
                    position: seat.cursor,
                }
            }
        };

        self.emit(event);
        Ok(seat_id)
    }

    pub fn route_pointer_button(
        &mut self,
        device_id: &DeviceId,
        button: u32,
        pressed: bool,
    ) -> Result<SeatId, SeatError> {
        let seat_id = self.routable_seat(device_id)?;
        let focus = self.get_seat(seat_id)?.pointer_focus.clone();

        debug!(device = %device_id, seat = %seat_id, button, pressed, "pointer button routed");
        self.emit(SeatEvent::PointerButton {
            seat: seat_id,
            device: device_id.clone(),
            button,
            pressed,
            focus,
        });
        Ok(seat_id)
    }

    pub fn route_key_event(
        &mut self,
        device_id: &DeviceId,
        key: u32,
        pressed: bool,
    ) -> Result<SeatId, SeatError> {
        let seat_id = self.routable_seat(device_id)?;
        let focus = self.get_seat(seat_id)?.keyboard_focus.clone();

        debug!(device = %device_id, seat = %seat_id, key, pressed, "key routed");
        self.emit(SeatEvent::Key {
            seat: seat_id,
            device: device_id.clone(),
            key,
            pressed,
            focus,
        });
        Ok(seat_id)
    }

    /// Moves a seat's cursor to an absolute position.
    ///
    /// A locked cursor does not move; a confined one is clamped. Returns the
    /// resulting cursor position.
    pub fn warp_pointer(&mut self, seat_id: SeatId, x: f64, y: f64) -> Result<Position, SeatError> {
        let bounds = self.display_bounds;
        let seat = self.seat_mut(seat_id)?;

        let limit = match grab_constraint(seat.pointer_grab.as_ref()) {
            Some((GrabMode::PointerLock, _)) => return Ok(seat.cursor),
            Some((GrabMode::PointerConfine, region)) => region.or(bounds),
            None => bounds,
        };
        seat.cursor = constrain(Position::new(x, y), limit);
        let position = seat.cursor;

        debug!(seat = %seat_id, x = position.x, y = position.y, "cursor warped");
        self.emit(SeatEvent::CursorWarped {
            seat: seat_id,
            position,
        });
        Ok(position)
    }

    // ── Focus ──────────────────────────────────────────────────────────────

    /// Returns `true` if the focus actually changed.
    pub fn set_pointer_focus(
        &mut self,
        seat_id: SeatId,
        window: Option<WindowId>,
    ) -> Result<bool, SeatError> {
        self.set_focus(seat_id, FocusKind::Pointer, window)
    }

    /// Returns `true` if the focus actually changed.
    pub fn set_keyboard_focus(
        &mut self,
        seat_id: SeatId,
        window: Option<WindowId>,
    ) -> Result<bool, SeatError> {
        self.set_focus(seat_id, FocusKind::Keyboard, window)
    }

    fn set_focus(
        &mut self,
        seat_id: SeatId,
        kind: FocusKind,
        window: Option<WindowId>,
    ) -> Result<bool, SeatError> {
        let seat = self.seat_mut(seat_id)?;
        let slot = match kind {
            FocusKind::Pointer => &mut seat.pointer_focus,
            FocusKind::Keyboard => &mut seat.keyboard_focus,
        };
        if *slot == window {
            return Ok(false);
        }
        slot.clone_from(&window);

        debug!(seat = %seat_id, ?kind, ?window, "focus changed");
        self.emit(SeatEvent::FocusChanged {
            seat: seat_id,
            kind,
            window,
        });
        Ok(true)
    }

    // ── Grabs ──────────────────────────────────────────────────────────────

    /// Installs a grab on one seat.
    ///
    /// Fails with [`SeatError::AlreadyGrabbed`] when the seat already has a
    /// grab; the existing grab is left untouched.  Other seats are never
    /// consulted.
    pub fn request_pointer_grab(
        &mut self,
        seat_id: SeatId,
        client: impl Into<ClientId>,
        mode: GrabMode,
    ) -> Result<Grab, SeatError> {
        self.install_grab(seat_id, client.into(), mode, None)
    }

    /// Installs a confine grab bounded by an explicit region.
    ///
    /// A region with zero width or height is rejected with
    /// [`SeatError::InvalidRegion`] and the seat is left as it was.
    pub fn request_pointer_confine(
        &mut self,
        seat_id: SeatId,
        client: impl Into<ClientId>,
        region: Rect,
    ) -> Result<Grab, SeatError> {
        self.get_seat(seat_id)?;
        if !region.is_valid() {
            return Err(SeatError::InvalidRegion(region));
        }
        self.install_grab(seat_id, client.into(), GrabMode::PointerConfine, Some(region))
    }

    fn install_grab(
        &mut self,
        seat_id: SeatId,
        client: ClientId,
        mode: GrabMode,
        region: Option<Rect>,
    ) -> Result<Grab, SeatError> {
        let seat = self.seat_mut(seat_id)?;
        if seat.pointer_grab.is_some() {
            return Err(SeatError::AlreadyGrabbed(seat.name.clone()));
        }
        let grab = Grab::new(seat_id, client.clone(), mode, region);
        seat.pointer_grab = Some(grab.clone());

        info!(seat = %seat_id, client = %client, mode = %mode, "pointer grab started");
        self.emit(SeatEvent::GrabStarted {
            seat: seat_id,
            client,
            mode,
        });
        Ok(grab)
    }

    /// Ends the grab on one seat and returns it.
    pub fn release_pointer_grab(&mut self, seat_id: SeatId) -> Result<Grab, SeatError> {
        let seat = self.seat_mut(seat_id)?;
        let grab = seat
            .pointer_grab
            .take()
            .ok_or_else(|| SeatError::NotGrabbed(seat.name.clone()))?;

        info!(seat = %seat_id, client = %grab.client(), "pointer grab released");
        self.emit(SeatEvent::GrabEnded {
            seat: seat_id,
            client: grab.client().clone(),
        });
        Ok(grab)
    }

    /// Ends every grab held by `client`, e.g. when it disconnects.
    ///
    /// Returns the seats that were released, in creation order.
    pub fn release_client_grabs(&mut self, client: &ClientId) -> Vec<SeatId> {
        let released: Vec<SeatId> = self
            .seats
            .values_mut()
            .filter(|seat| {
                seat.pointer_grab
                    .as_ref()
                    .is_some_and(|grab| grab.client() == client)
            })
            .map(|seat| {
                seat.pointer_grab = None;
                seat.id
            })
            .collect();

        for seat_id in &released {
            info!(seat = %seat_id, client = %client, "pointer grab released on client disconnect");
            self.emit(SeatEvent::GrabEnded {
                seat: *seat_id,
                client: client.clone(),
            });
        }
        released
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn seat_mut(&mut self, seat_id: SeatId) -> Result<&mut Seat, SeatError> {
        self.seats
            .get_mut(&seat_id)
            .ok_or(SeatError::UnknownSeat(seat_id))
    }

    /// Resolves the enabled seat a device's events go to.
    fn routable_seat(&self, device_id: &DeviceId) -> Result<SeatId, SeatError> {
        let seat_id = self
            .get_device(device_id)?
            .seat
            .ok_or_else(|| SeatError::UnassignedDevice(device_id.clone()))?;
        let seat = self.get_seat(seat_id)?;
        if !seat.enabled {
            return Err(SeatError::SeatDisabled(seat.name.clone()));
        }
        Ok(seat_id)
    }

    /// `base`, or the first of `base-2`, `base-3`, … that no seat uses.
    /// `Some(target)` when a USB rule covers the device.
    fn usb_rule_seat(&self, device: &Device) -> Option<Option<SeatId>> {
        if !device.has_usb_ids() {
            return None;
        }
        let usb_id = device.usb_identifier();
        let rule = self.usb_rules.iter().find(|rule| rule.usb_id == usb_id)?;
        match &rule.seat_name {
            None => Some(None),
            Some(name) => match self.get_seat_by_name(name) {
                Ok(seat) => Some(Some(seat.id())),
                Err(_) => {
                    warn!(usb_id = %usb_id, seat = %name, "usb seat rule names a missing seat");
                    None
                }
            },
        }
    }

    fn free_seat_name(&self, base: &str) -> String {
        let taken = |name: &str| self.seats.values().any(|seat| seat.name == name);
        if !taken(base) {
            return base.to_string();
        }
        (2u32..)
            .map(|n| format!("{base}-{n}"))
            .find(|name| !taken(name.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    fn emit(&mut self, event: SeatEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

fn grab_constraint(grab: Option<&Grab>) -> Option<(GrabMode, Option<Rect>)> {
    grab.map(|grab| (grab.mode(), grab.region()))
}

fn constrain(position: Position, limit: Option<Rect>) -> Position {
    match limit {
        Some(rect) => position.clamp_to(&rect),
        None => position,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::device::{Capabilities, DeviceKind};
    use crate::registry::error::ErrorKind;

    fn mouse(id: &str) -> Device {
        Device::new(id, format!("{id} (test)"), DeviceKind::Pointer)
    }

    /// Manager with `mouse1` on seat0 and `mouse2` on a fresh `aux` seat.
    fn two_seat_manager() -> (SeatManager, SeatId) {
        let mut manager = SeatManager::new();
        let aux = manager.create_seat("aux").unwrap();
        manager.register_device(mouse("mouse1")).unwrap();
        manager.register_device(mouse("mouse2")).unwrap();
        manager
            .assign_device(&"mouse1".into(), manager.default_seat_id())
            .unwrap();
        manager.assign_device(&"mouse2".into(), aux).unwrap();
        (manager, aux)
    }

    fn recorded(manager: &mut SeatManager) -> Arc<Mutex<Vec<SeatEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        manager.add_listener(Box::new(move |event: &SeatEvent| {
            sink.lock().unwrap().push(event.clone());
        }));
        events
    }

    #[test]
    fn test_new_manager_has_only_default_seat() {
        let manager = SeatManager::new();
        assert_eq!(manager.seat_count(), 1);
        assert_eq!(manager.default_seat().name(), DEFAULT_SEAT_NAME);
        assert_eq!(manager.device_count(), 0);
    }

    #[test]
    fn test_create_seat_rejects_duplicate_name() {
        // Arrange
        let mut manager = SeatManager::new();
        manager.create_seat("aux").unwrap();

        // Act
        let result = manager.create_seat("aux");

        // Assert
        assert_eq!(result, Err(SeatError::DuplicateName("aux".into())));
        assert_eq!(manager.seat_count(), 2);
    }

    #[test]
    fn test_destroyed_seat_ids_are_never_reused() {
        // Arrange
        let mut manager = SeatManager::new();
        let first = manager.create_seat("aux").unwrap();
        manager.destroy_seat(first).unwrap();

        // Act
        let second = manager.create_seat("aux").unwrap();

        // Assert
        assert_ne!(first, second);
        assert_eq!(
            manager.get_seat(first).unwrap_err(),
            SeatError::UnknownSeat(first)
        );
    }

    #[test]
    fn test_destroy_default_seat_is_refused() {
        let mut manager = SeatManager::new();
        let err = manager.destroy_seat(manager.default_seat_id()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SeatInUseError);
        assert_eq!(manager.seat_count(), 1);
    }

    #[test]
    fn test_destroy_seat_with_devices_is_refused() {
        let (mut manager, aux) = two_seat_manager();
        let err = manager.destroy_seat(aux).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SeatInUseError);
        assert!(manager.get_seat(aux).is_ok());
    }

    #[test]
    fn test_register_device_rejects_duplicates_and_invalid_records() {
        // Arrange
        let mut manager = SeatManager::new();
        manager.register_device(mouse("mouse1")).unwrap();
        let empty_caps = mouse("ghost").with_capabilities(Capabilities::empty());

        // Act
        let duplicate = manager.register_device(mouse("mouse1"));
        let invalid = manager.register_device(empty_caps);

        // Assert
        assert_eq!(
            duplicate.unwrap_err().kind(),
            ErrorKind::DuplicateDeviceError
        );
        assert_eq!(invalid.unwrap_err().kind(), ErrorKind::InvalidDeviceError);
        assert_eq!(manager.device_count(), 1);
    }

    #[test]
    fn test_reassign_moves_device_between_seats() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        let seat0 = manager.default_seat_id();
        let mouse1: DeviceId = "mouse1".into();

        // Act
        manager.assign_device(&mouse1, aux).unwrap();

        // Assert
        assert!(!manager.get_seat(seat0).unwrap().has_device(&mouse1));
        assert!(manager.get_seat(aux).unwrap().has_device(&mouse1));
        assert_eq!(manager.get_device(&mouse1).unwrap().seat(), Some(aux));
    }

    #[test]
    fn test_assign_to_unknown_seat_changes_nothing() {
        let (mut manager, _) = two_seat_manager();
        let mouse1: DeviceId = "mouse1".into();

        let err = manager.assign_device(&mouse1, SeatId(99)).unwrap_err();

        assert_eq!(err, SeatError::UnknownSeat(SeatId(99)));
        assert_eq!(
            manager.seat_for_device(&mouse1).map(Seat::id),
            Some(manager.default_seat_id())
        );
    }

    #[test]
    fn test_unassign_is_noop_for_unassigned_device() {
        let mut manager = SeatManager::new();
        manager.register_device(mouse("mouse1")).unwrap();
        assert_eq!(manager.unassign_device(&"mouse1".into()), Ok(None));
    }

    #[test]
    fn test_unregister_detaches_from_seat() {
        let (mut manager, aux) = two_seat_manager();
        let removed = manager.unregister_device(&"mouse2".into()).unwrap();

        assert_eq!(removed.id().as_str(), "mouse2");
        assert!(manager.get_seat(aux).unwrap().devices().is_empty());
        assert_eq!(manager.list_devices().count(), 1);
    }

    #[test]
    fn test_list_devices_preserves_registration_order() {
        let mut manager = SeatManager::new();
        for id in ["zeta", "alpha", "mid"] {
            manager.register_device(mouse(id)).unwrap();
        }
        let ids: Vec<&str> = manager.list_devices().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_hotplug_default_seat_policy() {
        let mut manager = SeatManager::new();
        let seat = manager.hotplug_device(mouse("usb-mouse")).unwrap();
        assert_eq!(seat, Some(manager.default_seat_id()));
    }

    #[test]
    fn test_hotplug_usb_rule_overrides_policy() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        manager.add_usb_rule(UsbSeatRule {
            usb_id: "046D:C077".into(),
            seat_name: Some("aux".into()),
            priority: 0,
        });

        // Act
        let ruled = manager
            .hotplug_device(mouse("logi").with_usb_ids(0x046d, 0xc077))
            .unwrap();
        let other = manager
            .hotplug_device(mouse("generic").with_usb_ids(0x1234, 0x0001))
            .unwrap();
        let plain = manager.hotplug_device(mouse("no-ids")).unwrap();

        // Assert
        assert_eq!(ruled, Some(aux));
        assert_eq!(other, Some(manager.default_seat_id()));
        assert_eq!(plain, Some(manager.default_seat_id()));
    }

    #[test]
    fn test_usb_rule_for_missing_seat_falls_back_to_policy() {
        let mut manager = SeatManager::new();
        assert!(manager.add_usb_rule(UsbSeatRule {
            usb_id: "046d:c077".into(),
            seat_name: Some("gone".into()),
            priority: 0,
        }));
        assert!(!manager.add_usb_rule(UsbSeatRule {
            usb_id: "046d:c077".into(),
            seat_name: None,
            priority: 0,
        }));

        let seat = manager
            .hotplug_device(mouse("logi").with_usb_ids(0x046d, 0xc077))
            .unwrap();

        assert_eq!(seat, Some(manager.default_seat_id()));
        assert_eq!(manager.usb_rules().len(), 1);
    }

    #[test]
    fn test_hotplug_new_seat_policy_suffixes_on_collision() {
        // Arrange
        let mut manager = SeatManager::with_options(ManagerOptions {
            hotplug_policy: HotplugPolicy::NewSeat,
            ..ManagerOptions::default()
        });
        manager.create_seat("pad").unwrap();

        // Act
        let seat = manager.hotplug_device(mouse("pad")).unwrap().unwrap();

        // Assert
        assert_eq!(manager.get_seat(seat).unwrap().name(), "pad-2");
        assert!(manager.get_seat(seat).unwrap().has_device(&"pad".into()));
    }

    #[test]
    fn test_hotplug_unassigned_policy_leaves_device_unassigned() {
        let mut manager = SeatManager::with_options(ManagerOptions {
            hotplug_policy: HotplugPolicy::Unassigned,
            ..ManagerOptions::default()
        });
        assert_eq!(manager.hotplug_device(mouse("m")).unwrap(), None);
        assert_eq!(manager.unassigned_devices().count(), 1);
    }

    #[test]
    fn test_routing_errors_for_unknown_and_unassigned_devices() {
        let mut manager = SeatManager::new();
        manager.register_device(mouse("loose")).unwrap();

        let unknown = manager.route_pointer_motion(&"nope".into(), 1.0, 1.0);
        let unassigned = manager.route_pointer_motion(&"loose".into(), 1.0, 1.0);

        assert_eq!(unknown.unwrap_err().kind(), ErrorKind::UnknownDeviceError);
        assert_eq!(
            unassigned.unwrap_err().kind(),
            ErrorKind::UnassignedDeviceError
        );
    }

    #[test]
    fn test_routing_to_disabled_seat_fails() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        manager.set_seat_enabled(aux, false).unwrap();

        // Act
        let result = manager.route_pointer_motion(&"mouse2".into(), 5.0, 5.0);

        // Assert
        assert_eq!(result, Err(SeatError::SeatDisabled("aux".into())));
        assert_eq!(manager.get_seat(aux).unwrap().cursor(), Position::default());
    }

    #[test]
    fn test_motion_is_clamped_to_display_bounds() {
        let mut manager = SeatManager::with_options(ManagerOptions {
            display_bounds: Some(Rect::new(0, 0, 100, 50)),
            ..ManagerOptions::default()
        });
        manager.hotplug_device(mouse("m")).unwrap();

        manager.route_pointer_motion(&"m".into(), 500.0, -20.0).unwrap();

        assert_eq!(manager.default_seat().cursor(), Position::new(99.0, 0.0));
    }

    #[test]
    fn test_lock_accumulates_relative_motion() {
        // Arrange
        let (mut manager, _) = two_seat_manager();
        let seat0 = manager.default_seat_id();
        manager
            .request_pointer_grab(seat0, "game", GrabMode::PointerLock)
            .unwrap();

        // Act
        manager.route_pointer_motion(&"mouse1".into(), 3.0, 4.0).unwrap();
        manager.route_pointer_motion(&"mouse1".into(), 1.0, -1.0).unwrap();

        // Assert
        let seat = manager.get_seat(seat0).unwrap();
        assert_eq!(seat.cursor(), Position::default());
        assert_eq!(seat.pointer_grab().unwrap().relative_motion(), (4.0, 3.0));
    }

    #[test]
    fn test_confine_region_clamps_motion() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        manager
            .request_pointer_confine(aux, "editor", Rect::new(10, 10, 20, 20))
            .unwrap();

        // Act
        manager.route_pointer_motion(&"mouse2".into(), 100.0, 15.0).unwrap();

        // Assert
        assert_eq!(
            manager.get_seat(aux).unwrap().cursor(),
            Position::new(29.0, 15.0)
        );
    }

    #[test]
    fn test_confine_region_without_area_is_rejected() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();

        // Act
        let result = manager.request_pointer_confine(aux, "editor", Rect::new(50, 50, 0, 0));
        manager.route_pointer_motion(&"mouse2".into(), 10.0, 10.0).unwrap();

        // Assert
        assert_eq!(
            result.unwrap_err(),
            SeatError::InvalidRegion(Rect::new(50, 50, 0, 0))
        );
        let seat = manager.get_seat(aux).unwrap();
        assert!(seat.pointer_grab().is_none());
        assert_eq!(seat.cursor(), Position::new(10.0, 10.0));
    }

    #[test]
    fn test_warp_is_ignored_under_lock() {
        let mut manager = SeatManager::new();
        let seat0 = manager.default_seat_id();
        manager.warp_pointer(seat0, 10.0, 10.0).unwrap();
        manager
            .request_pointer_grab(seat0, "game", GrabMode::PointerLock)
            .unwrap();

        let position = manager.warp_pointer(seat0, 80.0, 80.0).unwrap();

        assert_eq!(position, Position::new(10.0, 10.0));
    }

    #[test]
    fn test_second_grab_on_same_seat_is_refused() {
        // Arrange
        let mut manager = SeatManager::new();
        let seat0 = manager.default_seat_id();
        manager
            .request_pointer_grab(seat0, "game", GrabMode::PointerLock)
            .unwrap();

        // Act
        let err = manager
            .request_pointer_grab(seat0, "other", GrabMode::PointerConfine)
            .unwrap_err();

        // Assert
        assert_eq!(err, SeatError::AlreadyGrabbed("seat0".into()));
        let grab = manager.default_seat().pointer_grab().unwrap();
        assert_eq!(grab.client().as_str(), "game");
        assert_eq!(grab.mode(), GrabMode::PointerLock);
    }

    #[test]
    fn test_release_without_grab_fails() {
        let mut manager = SeatManager::new();
        let err = manager
            .release_pointer_grab(manager.default_seat_id())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotGrabbedError);
    }

    #[test]
    fn test_release_client_grabs_ends_every_grab_of_that_client() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        let seat0 = manager.default_seat_id();
        let third = manager.create_seat("third").unwrap();
        manager
            .request_pointer_grab(seat0, "game", GrabMode::PointerLock)
            .unwrap();
        manager
            .request_pointer_grab(aux, "game", GrabMode::PointerConfine)
            .unwrap();
        manager
            .request_pointer_grab(third, "editor", GrabMode::PointerLock)
            .unwrap();

        // Act
        let released = manager.release_client_grabs(&"game".into());

        // Assert
        assert_eq!(released, vec![seat0, aux]);
        assert_eq!(manager.active_grabs().count(), 1);
        assert!(manager.get_seat(third).unwrap().is_pointer_grabbed());
    }

    #[test]
    fn test_focus_change_reports_whether_anything_changed() {
        let mut manager = SeatManager::new();
        let seat0 = manager.default_seat_id();

        assert_eq!(
            manager.set_pointer_focus(seat0, Some("term".into())),
            Ok(true)
        );
        assert_eq!(
            manager.set_pointer_focus(seat0, Some("term".into())),
            Ok(false)
        );
        assert!(manager.default_seat().keyboard_focus().is_none());
    }

    #[test]
    fn test_button_event_carries_pointer_focus() {
        // Arrange
        let (mut manager, aux) = two_seat_manager();
        manager.set_pointer_focus(aux, Some("browser".into())).unwrap();
        let events = recorded(&mut manager);

        // Act
        manager.route_pointer_button(&"mouse2".into(), 272, true).unwrap();

        // Assert
        let events = events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[SeatEvent::PointerButton {
                seat: aux,
                device: "mouse2".into(),
                button: 272,
                pressed: true,
                focus: Some("browser".into()),
            }]
        );
    }

    #[test]
    fn test_reassignment_emits_one_event() {
        let (mut manager, aux) = two_seat_manager();
        let events = recorded(&mut manager);

        manager.assign_device(&"mouse1".into(), aux).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SeatEvent::DeviceAssigned { previous: Some(SeatId(0)), .. }
        ));
    }

    #[test]
    fn test_failed_operations_emit_nothing() {
        let mut manager = SeatManager::new();
        let events = recorded(&mut manager);

        let _ = manager.create_seat("seat0");
        let _ = manager.release_pointer_grab(manager.default_seat_id());
        let _ = manager.route_key_event(&"nope".into(), 30, true);

        assert!(events.lock().unwrap().is_empty());
    }
}
