//! Simulator error type.

use mpx_core::{DeviceId, ErrorKind, SeatError, WindowId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimError {
    /// A registry operation failed.
    #[error(transparent)]
    Seat(#[from] SeatError),

    #[error("window '{0}' not found")]
    UnknownWindow(WindowId),

    #[error("window '{0}' already exists")]
    DuplicateWindow(WindowId),

    #[error("window '{id}' has an invalid geometry: {width}x{height}")]
    InvalidWindow {
        id: WindowId,
        width: u32,
        height: u32,
    },

    #[error("virtual device '{0}' was never connected")]
    UnknownVirtualDevice(DeviceId),
}

impl SimError {
    /// The registry error kind, when the failure came from the registry.
    pub fn seat_kind(&self) -> Option<ErrorKind> {
        match self {
            SimError::Seat(err) => Some(err.kind()),
            _ => None,
        }
    }
}
