//! Notifications emitted by the registry after each successful state change.
//!
//! Listeners observe; they cannot veto or alter the transition that produced
//! the event. A listener is handed the event only after the manager's state
//! already reflects it.

use crate::domain::{
    device::DeviceId,
    geometry::Position,
    grab::{ClientId, GrabMode},
    seat::{SeatId, WindowId},
};

/// Which of a seat's two focus slots changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKind {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeatEvent {
    SeatCreated {
        seat: SeatId,
        name: String,
    },
    SeatDestroyed {
        seat: SeatId,
        name: String,
    },
    SeatStateChanged {
        seat: SeatId,
        enabled: bool,
    },
    DeviceAdded {
        device: DeviceId,
    },
    DeviceRemoved {
        device: DeviceId,
    },
    /// A device moved onto `seat`, leaving `previous` in the same step.
    DeviceAssigned {
        device: DeviceId,
        seat: SeatId,
        previous: Option<SeatId>,
    },
    DeviceUnassigned {
        device: DeviceId,
        seat: SeatId,
    },
    /// Absolute cursor motion; `position` is the cursor after constraints.
    PointerMotion {
        seat: SeatId,
        device: DeviceId,
        dx: f64,
        dy: f64,
        position: Position,
    },
    /// Motion consumed by a pointer lock; the cursor did not move.
    RelativeMotion {
        seat: SeatId,
        device: DeviceId,
        dx: f64,
        dy: f64,
    },
    /// Absolute reposition of a seat's cursor, not tied to a device.
    CursorWarped {
        seat: SeatId,
        position: Position,
    },
    PointerButton {
        seat: SeatId,
        device: DeviceId,
        button: u32,
        pressed: bool,
        focus: Option<WindowId>,
    },
    Key {
        seat: SeatId,
        device: DeviceId,
        key: u32,
        pressed: bool,
        focus: Option<WindowId>,
    },
    GrabStarted {
        seat: SeatId,
        client: ClientId,
        mode: GrabMode,
    },
    GrabEnded {
        seat: SeatId,
        client: ClientId,
    },
    FocusChanged {
        seat: SeatId,
        kind: FocusKind,
        window: Option<WindowId>,
    },
}

impl SeatEvent {
    /// The seat this event concerns, if any.
    pub fn seat(&self) -> Option<SeatId> {
        match self {
            SeatEvent::DeviceAdded { .. } | SeatEvent::DeviceRemoved { .. } => None,
            SeatEvent::SeatCreated { seat, .. }
            | SeatEvent::SeatDestroyed { seat, .. }
            | SeatEvent::SeatStateChanged { seat, .. }
            | SeatEvent::DeviceAssigned { seat, .. }
            | SeatEvent::DeviceUnassigned { seat, .. }
            | SeatEvent::PointerMotion { seat, .. }
            | SeatEvent::RelativeMotion { seat, .. }
            | SeatEvent::CursorWarped { seat, .. }
            | SeatEvent::PointerButton { seat, .. }
            | SeatEvent::Key { seat, .. }
            | SeatEvent::GrabStarted { seat, .. }
            | SeatEvent::GrabEnded { seat, .. }
            | SeatEvent::FocusChanged { seat, .. } => Some(*seat),
        }
    }
}

/// Handle returned by [`SeatManager::add_listener`](super::SeatManager::add_listener),
/// used to detach that listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Receives [`SeatEvent`]s from a [`SeatManager`](super::SeatManager).
///
/// Any `FnMut(&SeatEvent) + Send` closure is a listener.
pub trait SeatEventListener: Send {
    fn on_event(&mut self, event: &SeatEvent);
}

impl<F> SeatEventListener for F
where
    F: FnMut(&SeatEvent) + Send,
{
    fn on_event(&mut self, event: &SeatEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::registry::SeatManager;

    mock! {
        pub Listener {}

        impl SeatEventListener for Listener {
            fn on_event(&mut self, event: &SeatEvent);
        }
    }

    #[test]
    fn test_listener_receives_seat_created() {
        // Arrange
        let mut listener = MockListener::new();
        listener
            .expect_on_event()
            .withf(|event| matches!(event, SeatEvent::SeatCreated { name, .. } if name == "aux"))
            .times(1)
            .return_const(());
        let mut manager = SeatManager::new();
        manager.add_listener(Box::new(listener));

        // Act
        manager.create_seat("aux").unwrap();
    }

    #[test]
    fn test_failed_operation_emits_nothing() {
        let mut listener = MockListener::new();
        listener.expect_on_event().never();
        let mut manager = SeatManager::new();
        manager.add_listener(Box::new(listener));

        let result = manager.create_seat("seat0");

        assert!(result.is_err());
    }

    #[test]
    fn test_removed_listener_stops_receiving_events() {
        // Arrange
        let mut kept = MockListener::new();
        kept.expect_on_event().times(2).return_const(());
        let mut removed = MockListener::new();
        removed.expect_on_event().times(1).return_const(());
        let mut manager = SeatManager::new();
        manager.add_listener(Box::new(kept));
        let handle = manager.add_listener(Box::new(removed));
        manager.create_seat("aux").unwrap();

        // Act
        let detached = manager.remove_listener(handle);
        let again = manager.remove_listener(handle);
        manager.create_seat("aux2").unwrap();

        // Assert
        assert!(detached);
        assert!(!again);
    }

    #[test]
    fn test_device_events_have_no_seat() {
        let event = SeatEvent::DeviceAdded {
            device: DeviceId::new("m"),
        };

        assert_eq!(event.seat(), None);
    }
}
