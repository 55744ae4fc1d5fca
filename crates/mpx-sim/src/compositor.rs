//! `VirtualCompositor`: a headless stand-in for a multi-seat Wayland
//! compositor.
//!
//! It owns a [`SeatManager`], a stack of windows and a set of virtual
//! devices.  Synthetic input goes in through the `dispatch_*` methods; the
//! compositor routes it through the manager, then hit-tests the affected
//! seat's cursor against the window stack to keep that seat's pointer focus
//! current.
//!
//! The compositor never writes seat or device fields itself.  Every change to
//! them is a call on the manager.

use mpx_core::{
    ClientId, DeviceId, Grab, GrabMode, ManagerOptions, Position, Rect, SeatId, SeatManager,
    WindowId,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SimError;
use crate::virtual_device::VirtualDevice;
use crate::window::Window;

/// One entry in the compositor's event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    DeviceConnected {
        device: DeviceId,
        seat: SeatId,
    },
    DeviceDisconnected {
        device: DeviceId,
    },
    WindowCreated {
        window: WindowId,
    },
    WindowDestroyed {
        window: WindowId,
    },
    PointerMoved {
        device: DeviceId,
        seat: SeatId,
        dx: f64,
        dy: f64,
    },
    PointerButton {
        device: DeviceId,
        seat: SeatId,
        button: u32,
        pressed: bool,
    },
    Key {
        device: DeviceId,
        seat: SeatId,
        key: u32,
        pressed: bool,
    },
    GrabRequested {
        client: ClientId,
        seat: SeatId,
        mode: GrabMode,
        granted: bool,
    },
    GrabReleased {
        client: ClientId,
        seat: SeatId,
    },
    ClientDisconnected {
        client: ClientId,
        released: Vec<SeatId>,
    },
}

pub struct VirtualCompositor {
    display: Rect,
    manager: SeatManager,
    /// Stacking order: the last window is topmost.
    windows: Vec<Window>,
    /// Every device ever connected, in first-connection order.
    devices: Vec<VirtualDevice>,
    event_log: Vec<SimEvent>,
}

impl VirtualCompositor {
    /// Creates a compositor with a `width`×`height` display and a manager
    /// holding only the default seat.
    pub fn new(width: u32, height: u32) -> Self {
        let display = Rect::new(0, 0, width, height);
        Self::with_manager_options(ManagerOptions {
            display_bounds: Some(display),
            ..ManagerOptions::default()
        })
    }

    /// Creates a compositor whose display is `options.display_bounds`
    /// (1920×1080 when unset).
    pub fn with_manager_options(mut options: ManagerOptions) -> Self {
        let display = *options
            .display_bounds
            .get_or_insert(Rect::new(0, 0, 1920, 1080));
        Self {
            display,
            manager: SeatManager::with_options(options),
            windows: Vec::new(),
            devices: Vec::new(),
            event_log: Vec::new(),
        }
    }

    pub fn display(&self) -> Rect {
        self.display
    }

    pub fn manager(&self) -> &SeatManager {
        &self.manager
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn devices(&self) -> &[VirtualDevice] {
        &self.devices
    }

    pub fn device(&self, id: &DeviceId) -> Option<&VirtualDevice> {
        self.devices.iter().find(|d| d.id() == id)
    }

    pub fn event_log(&self) -> &[SimEvent] {
        &self.event_log
    }

    /// Resolves a seat name to its id.
    pub fn seat_id(&self, name: &str) -> Result<SeatId, SimError> {
        Ok(self.manager.get_seat_by_name(name)?.id())
    }

    // ── Seats ────────────────────────────────────────────────────────────────

    pub fn create_seat(&mut self, name: &str) -> Result<SeatId, SimError> {
        Ok(self.manager.create_seat(name)?)
    }

    pub fn destroy_seat(&mut self, seat: SeatId) -> Result<(), SimError> {
        Ok(self.manager.destroy_seat(seat)?)
    }

    pub fn assign_device(&mut self, device: &DeviceId, seat: SeatId) -> Result<(), SimError> {
        Ok(self.manager.assign_device(device, seat)?)
    }

    // ── Devices ──────────────────────────────────────────────────────────────

    /// Connects a virtual device and assigns it to the seat named
    /// `seat_name`.
    ///
    /// The seat is resolved before anything is registered, so an unknown
    /// seat leaves no half-connected device behind.  Reconnecting a device
    /// that was disconnected replaces its old record.
    pub fn connect_device(
        &mut self,
        mut device: VirtualDevice,
        seat_name: &str,
    ) -> Result<SeatId, SimError> {
        let seat = self.seat_id(seat_name)?;

        device.connected = true;
        self.manager.register_device(device.to_device())?;
        self.manager.assign_device(device.id(), seat)?;

        let id = device.id().clone();
        info!(device = %id, name = device.name(), seat = seat_name, "virtual device connected");
        match self.devices.iter_mut().find(|d| d.id() == &id) {
            Some(existing) => *existing = device,
            None => self.devices.push(device),
        }
        self.event_log
            .push(SimEvent::DeviceConnected { device: id, seat });
        Ok(seat)
    }

    /// Unregisters a device but keeps its record, marked disconnected.
    ///
    /// Disconnecting an already-disconnected device does nothing.
    pub fn disconnect_device(&mut self, id: &DeviceId) -> Result<(), SimError> {
        let index = self
            .devices
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| SimError::UnknownVirtualDevice(id.clone()))?;
        if !self.devices[index].connected {
            return Ok(());
        }

        self.manager.unregister_device(id)?;
        let device = &mut self.devices[index];
        device.connected = false;
        device.buttons_pressed.clear();
        device.keys_pressed.clear();

        info!(device = %id, "virtual device disconnected");
        self.event_log
            .push(SimEvent::DeviceDisconnected { device: id.clone() });
        Ok(())
    }

    // ── Windows ──────────────────────────────────────────────────────────────

    /// Opens a window on top of the stack.  Windows may overlap.
    pub fn create_window(
        &mut self,
        id: impl Into<WindowId>,
        title: impl Into<String>,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SimError> {
        let id = id.into();
        let rect = Rect::new(x, y, width, height);
        if !rect.is_valid() {
            return Err(SimError::InvalidWindow { id, width, height });
        }
        if self.window(&id).is_some() {
            return Err(SimError::DuplicateWindow(id));
        }

        let title = title.into();
        info!(window = %id, title = %title, x, y, width, height, "window created");
        self.windows.push(Window::new(id.clone(), title, rect));
        self.event_log.push(SimEvent::WindowCreated { window: id });
        Ok(())
    }

    /// Closes a window.
    ///
    /// Any seat focus on the window is cleared, and any grab the window holds
    /// as a client is released.
    pub fn destroy_window(&mut self, id: &WindowId) -> Result<Window, SimError> {
        let index = self
            .windows
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| SimError::UnknownWindow(id.clone()))?;
        let window = self.windows.remove(index);

        let seats: Vec<SeatId> = self.manager.list_seats().map(|s| s.id()).collect();
        for seat in seats {
            let (pointer, keyboard) = {
                let state = self.manager.get_seat(seat)?;
                (
                    state.pointer_focus() == Some(id),
                    state.keyboard_focus() == Some(id),
                )
            };
            if pointer {
                self.manager.set_pointer_focus(seat, None)?;
            }
            if keyboard {
                self.manager.set_keyboard_focus(seat, None)?;
            }
        }
        self.manager
            .release_client_grabs(&ClientId::new(id.as_str()));

        info!(window = %id, "window destroyed");
        self.event_log
            .push(SimEvent::WindowDestroyed { window: id.clone() });
        Ok(window)
    }

    pub fn window(&self, id: &WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id() == id)
    }

    /// The topmost window containing `pos`.
    pub fn window_at(&self, pos: Position) -> Option<&Window> {
        self.windows.iter().rev().find(|w| w.contains(pos))
    }

    /// The grab whose client is this window, if any seat holds one.
    pub fn window_grab(&self, id: &WindowId) -> Option<&Grab> {
        self.manager
            .active_grabs()
            .find(|grab| grab.client().as_str() == id.as_str())
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Routes relative motion and re-evaluates the pointer focus of the seat
    /// that received it.
    pub fn dispatch_pointer_motion(
        &mut self,
        device: &DeviceId,
        dx: f64,
        dy: f64,
    ) -> Result<SeatId, SimError> {
        let seat = self.manager.route_pointer_motion(device, dx, dy)?;
        self.refresh_pointer_focus(seat)?;
        self.event_log.push(SimEvent::PointerMoved {
            device: device.clone(),
            seat,
            dx,
            dy,
        });
        Ok(seat)
    }

    /// Moves the device's seat cursor towards an absolute position.
    ///
    /// The move is sent as the relative delta from the seat's current cursor,
    /// so locks and confines apply exactly as for relative motion.
    pub fn move_pointer_to(
        &mut self,
        device: &DeviceId,
        x: f64,
        y: f64,
    ) -> Result<SeatId, SimError> {
        let from = self
            .manager
            .seat_for_device(device)
            .map(|seat| seat.cursor())
            .unwrap_or_default();
        self.dispatch_pointer_motion(device, x - from.x, y - from.y)
    }

    /// Routes a button event.  A press also gives keyboard focus to whatever
    /// the seat's pointer is over.
    pub fn dispatch_pointer_button(
        &mut self,
        device: &DeviceId,
        button: u32,
        pressed: bool,
    ) -> Result<SeatId, SimError> {
        let seat = self.manager.route_pointer_button(device, button, pressed)?;
        if pressed {
            let focus = self.manager.get_seat(seat)?.pointer_focus().cloned();
            self.manager.set_keyboard_focus(seat, focus)?;
        }
        if let Some(virtual_device) = self.devices.iter_mut().find(|d| d.id() == device) {
            virtual_device.record_button(button, pressed);
        }
        self.event_log.push(SimEvent::PointerButton {
            device: device.clone(),
            seat,
            button,
            pressed,
        });
        Ok(seat)
    }

    pub fn dispatch_key(
        &mut self,
        device: &DeviceId,
        key: u32,
        pressed: bool,
    ) -> Result<SeatId, SimError> {
        let seat = self.manager.route_key_event(device, key, pressed)?;
        if let Some(virtual_device) = self.devices.iter_mut().find(|d| d.id() == device) {
            virtual_device.record_key(key, pressed);
        }
        self.event_log.push(SimEvent::Key {
            device: device.clone(),
            seat,
            key,
            pressed,
        });
        Ok(seat)
    }

    /// Places a seat's cursor directly, as a compositor does on warp requests.
    pub fn warp_pointer(&mut self, seat: SeatId, x: f64, y: f64) -> Result<Position, SimError> {
        let position = self.manager.warp_pointer(seat, x, y)?;
        self.refresh_pointer_focus(seat)?;
        Ok(position)
    }

    fn refresh_pointer_focus(&mut self, seat: SeatId) -> Result<(), SimError> {
        let cursor = self.manager.get_seat(seat)?.cursor();
        let target = self.window_at(cursor).map(|w| w.id().clone());
        if self.manager.set_pointer_focus(seat, target.clone())? {
            debug!(seat = %seat, window = ?target, "pointer focus moved");
        }
        Ok(())
    }

    // ── Grabs ────────────────────────────────────────────────────────────────

    pub fn request_grab(
        &mut self,
        client: impl Into<ClientId>,
        seat: SeatId,
        mode: GrabMode,
    ) -> Result<Grab, SimError> {
        let client = client.into();
        let result = self.manager.request_pointer_grab(seat, client.clone(), mode);
        self.log_grab_request(client, seat, mode, result.is_ok());
        Ok(result?)
    }

    /// Confines a seat's pointer to `region`.
    pub fn request_confine(
        &mut self,
        client: impl Into<ClientId>,
        seat: SeatId,
        region: Rect,
    ) -> Result<Grab, SimError> {
        let client = client.into();
        let result = self
            .manager
            .request_pointer_confine(seat, client.clone(), region);
        self.log_grab_request(client, seat, GrabMode::PointerConfine, result.is_ok());
        Ok(result?)
    }

    fn log_grab_request(&mut self, client: ClientId, seat: SeatId, mode: GrabMode, granted: bool) {
        self.event_log.push(SimEvent::GrabRequested {
            client,
            seat,
            mode,
            granted,
        });
    }

    pub fn release_grab(&mut self, seat: SeatId) -> Result<Grab, SimError> {
        let grab = self.manager.release_pointer_grab(seat)?;
        self.event_log.push(SimEvent::GrabReleased {
            client: grab.client().clone(),
            seat,
        });
        Ok(grab)
    }

    /// Ends every grab held by `client`.
    pub fn disconnect_client(&mut self, client: &ClientId) -> Vec<SeatId> {
        let released = self.manager.release_client_grabs(client);
        self.event_log.push(SimEvent::ClientDisconnected {
            client: client.clone(),
            released: released.clone(),
        });
        released
    }
}

impl Default for VirtualCompositor {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
