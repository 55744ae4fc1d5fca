//! Virtual windows: rectangles the compositor hit-tests to derive focus.

use mpx_core::{Position, Rect, WindowId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    id: WindowId,
    title: String,
    rect: Rect,
}

impl Window {
    pub(crate) fn new(id: WindowId, title: String, rect: Rect) -> Self {
        Self { id, title, rect }
    }

    pub fn id(&self) -> &WindowId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// `true` if `pos` lies inside the window (right and bottom edges excluded).
    pub fn contains(&self, pos: Position) -> bool {
        self.rect.contains(pos)
    }
}
