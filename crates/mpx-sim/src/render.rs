//! ASCII snapshot of the virtual display.

use crate::compositor::VirtualCompositor;

/// Cursor glyphs, assigned to seats in creation order and reused cyclically.
pub const CURSOR_GLYPHS: [char; 5] = ['@', '*', 'X', 'O', '+'];

const BORDER_CORNER: char = '+';
const BORDER_HORIZONTAL: char = '-';
const BORDER_VERTICAL: char = '|';
const WINDOW_GRABBED: char = '#';
const WINDOW_PLAIN: char = '.';

/// A character grid whose border cells are write-protected once drawn.
struct Canvas {
    cells: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        let mut cells = vec![vec![' '; width]; height];
        for x in 0..width {
            cells[0][x] = BORDER_HORIZONTAL;
            cells[height - 1][x] = BORDER_HORIZONTAL;
        }
        for row in cells.iter_mut() {
            row[0] = BORDER_VERTICAL;
            row[width - 1] = BORDER_VERTICAL;
        }
        for (y, x) in [(0, 0), (0, width - 1), (height - 1, 0), (height - 1, width - 1)] {
            cells[y][x] = BORDER_CORNER;
        }
        Self {
            cells,
            width,
            height,
        }
    }

    /// Writes `c` if `(x, y)` is inside the border.
    fn put(&mut self, x: usize, y: usize, c: char) {
        if (1..self.width - 1).contains(&x) && (1..self.height - 1).contains(&y) {
            self.cells[y][x] = c;
        }
    }

    /// Maps a scaled coordinate onto the interior, `1..=limit - 2`.
    fn interior(value: f64, limit: usize) -> usize {
        (value as i64).clamp(1, limit as i64 - 2) as usize
    }

    fn into_lines(self) -> Vec<String> {
        self.cells
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }
}

impl VirtualCompositor {
    /// Renders the display as a `width`×`height` character grid followed by a
    /// `Cursors:` legend line.
    ///
    /// Windows are drawn bottom to top as outlines (`#` when the window holds
    /// a grab, `.` otherwise) with their title on the first inner row.  Seat
    /// cursors are drawn last, in seat creation order.  Grids smaller than
    /// 3×3 are enlarged to 3×3.
    pub fn render_ascii(&self, width: usize, height: usize) -> String {
        let width = width.max(3);
        let height = height.max(3);
        let display = self.display();
        let scale_x = width as f64 / display.width.max(1) as f64;
        let scale_y = height as f64 / display.height.max(1) as f64;
        let mut canvas = Canvas::new(width, height);

        for window in self.windows() {
            let rect = window.rect();
            let x1 = Canvas::interior(f64::from(rect.x) * scale_x, width);
            let y1 = Canvas::interior(f64::from(rect.y) * scale_y, height);
            let x2 = Canvas::interior(rect.right() as f64 * scale_x, width);
            let y2 = Canvas::interior(rect.bottom() as f64 * scale_y, height);
            let glyph = if self.window_grab(window.id()).is_some() {
                WINDOW_GRABBED
            } else {
                WINDOW_PLAIN
            };

            for x in x1..x2 {
                canvas.put(x, y1, glyph);
                canvas.put(x, y2 - 1, glyph);
            }
            for y in y1..y2 {
                canvas.put(x1, y, glyph);
                canvas.put(x2 - 1, y, glyph);
            }
            let room = (x2 - x1).saturating_sub(2);
            for (i, c) in window.title().chars().take(room).enumerate() {
                canvas.put(x1 + 1 + i, y1 + 1, c);
            }
        }

        let mut legend = vec!["Cursors:".to_string()];
        for (i, seat) in self.manager().list_seats().enumerate() {
            let glyph = CURSOR_GLYPHS[i % CURSOR_GLYPHS.len()];
            let cursor = seat.cursor();
            canvas.put(
                Canvas::interior(cursor.x * scale_x, width),
                Canvas::interior(cursor.y * scale_y, height),
                glyph,
            );
            let grabbed = if seat.is_pointer_grabbed() {
                "[GRABBED]"
            } else {
                ""
            };
            legend.push(format!("{glyph}={}{grabbed}", seat.name()));
        }

        let mut lines = canvas.into_lines();
        lines.push(legend.join(" "));
        lines.join("\n")
    }
}
