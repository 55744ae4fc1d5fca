//! Pointer grabs.
//!
//! A grab is one client's exclusive claim on a single seat's pointer. It is
//! stored inside that seat's record and never consulted for any other seat,
//! which is what keeps a game's pointer lock on `seat0` from freezing the
//! pointer of `aux`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::seat::SeatId;

/// Identifies the client (application or surface) that requested a grab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a grab constrains pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabMode {
    /// Absolute position frozen; motion is reported as relative deltas only.
    PointerLock,
    /// Absolute position clamped to a region; motion is still absolute.
    PointerConfine,
}

impl GrabMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GrabMode::PointerLock => "POINTER_LOCK",
            GrabMode::PointerConfine => "POINTER_CONFINE",
        }
    }
}

impl fmt::Display for GrabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active pointer grab on one seat.
#[derive(Debug, Clone, PartialEq)]
pub struct Grab {
    seat: SeatId,
    client: ClientId,
    mode: GrabMode,
    region: Option<Rect>,
    relative_motion: (f64, f64),
}

impl Grab {
    pub(crate) fn new(
        seat: SeatId,
        client: ClientId,
        mode: GrabMode,
        region: Option<Rect>,
    ) -> Self {
        Self {
            seat,
            client,
            mode,
            region,
            relative_motion: (0.0, 0.0),
        }
    }

    pub fn seat(&self) -> SeatId {
        self.seat
    }

    pub fn client(&self) -> &ClientId {
        &self.client
    }

    pub fn mode(&self) -> GrabMode {
        self.mode
    }

    /// Explicit confine region, if one was requested.
    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Sum of the deltas consumed while the pointer was locked.
    pub fn relative_motion(&self) -> (f64, f64) {
        self.relative_motion
    }

    pub(crate) fn consume_delta(&mut self, dx: f64, dy: f64) {
        self.relative_motion.0 += dx;
        self.relative_motion.1 += dy;
    }
}
