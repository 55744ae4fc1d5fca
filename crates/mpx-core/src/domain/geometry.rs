//! Virtual coordinate space primitives.
//!
//! All cursor positions and window rectangles live in one unified virtual
//! coordinate space whose origin is the top-left corner of the display.

use serde::{Deserialize, Serialize};

/// A point in virtual space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns a new position moved by the given delta.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns this position clamped into `bounds`.
    ///
    /// The maxima are inclusive pixel coordinates (`x + width - 1`), so a
    /// clamped cursor always lies on a pixel that [`Rect::contains`] accepts.
    pub fn clamp_to(self, bounds: &Rect) -> Self {
        let max_x = bounds.x as f64 + (bounds.width as f64 - 1.0).max(0.0);
        let max_y = bounds.y as f64 + (bounds.height as f64 - 1.0).max(0.0);
        Self {
            x: self.x.clamp(bounds.x as f64, max_x),
            y: self.y.clamp(bounds.y as f64, max_y),
        }
    }
}

/// An axis-aligned rectangle in virtual space.
///
/// `x` and `y` are the top-left corner; the region is half-open, covering
/// `x..x + width` horizontally and `y..y + height` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns `true` if both extents are positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Returns `true` if `pos` lies inside the rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x as f64
            && pos.x < self.right() as f64
            && pos.y >= self.y as f64
            && pos.y < self.bottom() as f64
    }
}
