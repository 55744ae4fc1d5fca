//! Registry error taxonomy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{device::DeviceId, geometry::Rect, seat::SeatId};

/// Errors returned by [`SeatManager`](super::SeatManager) operations.
///
/// Every variant is a local, recoverable condition. The manager never logs,
/// swallows or retries them; the caller decides what happens next.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeatError {
    /// A seat with this name already exists.
    #[error("seat name '{0}' is already in use")]
    DuplicateName(String),

    #[error("seat {0} not found")]
    UnknownSeat(SeatId),

    #[error("seat '{0}' not found")]
    UnknownSeatName(String),

    #[error("device '{0}' not found")]
    UnknownDevice(DeviceId),

    /// Destroying the default seat, or a seat that still has devices.
    #[error("seat '{name}' cannot be destroyed: {reason}")]
    SeatInUse { name: String, reason: String },

    #[error("device '{0}' is already registered")]
    DuplicateDevice(DeviceId),

    #[error("device '{0}' is not assigned to any seat")]
    UnassignedDevice(DeviceId),

    #[error("seat '{0}' already has an active pointer grab")]
    AlreadyGrabbed(String),

    #[error("seat '{0}' has no active pointer grab")]
    NotGrabbed(String),

    #[error("seat '{0}' is disabled")]
    SeatDisabled(String),

    #[error("invalid device '{id}': {reason}")]
    InvalidDevice { id: DeviceId, reason: String },

    /// A confine region with zero width or height.
    #[error("confine region {}x{} at ({}, {}) has no area", .0.width, .0.height, .0.x, .0.y)]
    InvalidRegion(Rect),
}

/// Stable, machine-readable error kind.
///
/// The names match the taxonomy the control CLI prints, e.g.
/// `error[SeatInUseError]: ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    DuplicateNameError,
    UnknownSeatError,
    UnknownDeviceError,
    SeatInUseError,
    DuplicateDeviceError,
    UnassignedDeviceError,
    AlreadyGrabbedError,
    NotGrabbedError,
    SeatDisabledError,
    InvalidDeviceError,
    InvalidRegionError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl SeatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeatError::DuplicateName(_) => ErrorKind::DuplicateNameError,
            SeatError::UnknownSeat(_) | SeatError::UnknownSeatName(_) => {
                ErrorKind::UnknownSeatError
            }
            SeatError::UnknownDevice(_) => ErrorKind::UnknownDeviceError,
            SeatError::SeatInUse { .. } => ErrorKind::SeatInUseError,
            SeatError::DuplicateDevice(_) => ErrorKind::DuplicateDeviceError,
            SeatError::UnassignedDevice(_) => ErrorKind::UnassignedDeviceError,
            SeatError::AlreadyGrabbed(_) => ErrorKind::AlreadyGrabbedError,
            SeatError::NotGrabbed(_) => ErrorKind::NotGrabbedError,
            SeatError::SeatDisabled(_) => ErrorKind::SeatDisabledError,
            SeatError::InvalidDevice { .. } => ErrorKind::InvalidDeviceError,
            SeatError::InvalidRegion(_) => ErrorKind::InvalidRegionError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_seat_variants_share_a_kind() {
        assert_eq!(
            SeatError::UnknownSeat(SeatId(4)).kind(),
            SeatError::UnknownSeatName("aux".into()).kind()
        );
    }

    #[test]
    fn test_kind_display_matches_taxonomy_name() {
        let err = SeatError::SeatInUse {
            name: "seat0".into(),
            reason: "default seat".into(),
        };
        assert_eq!(err.kind().to_string(), "SeatInUseError");
    }

    #[test]
    fn test_invalid_region_message_names_the_extents() {
        let err = SeatError::InvalidRegion(Rect::new(50, 50, 0, 10));
        assert_eq!(err.to_string(), "confine region 0x10 at (50, 50) has no area");
        assert_eq!(err.kind(), ErrorKind::InvalidRegionError);
    }

    #[test]
    fn test_error_messages_name_the_target() {
        let err = SeatError::UnassignedDevice(DeviceId::new("mouse2"));
        assert_eq!(err.to_string(), "device 'mouse2' is not assigned to any seat");
    }
}
