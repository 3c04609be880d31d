//! FrameBuffer - The cell grid a frame is painted into.
//!
//! Flat row-major storage: `index = y * width + x`. Writes outside the grid
//! are dropped, so painting code never has to clip.

use unicode_width::UnicodeWidthChar;

use crate::types::{Cell, Style, CONTINUATION};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Get a cell (None if out of bounds).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Set a cell. Returns false when out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Write `text` starting at column `x` of row `y`.
    ///
    /// Double-width characters take two cells; the second holds
    /// [`CONTINUATION`]. Returns the column after the last written cell.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if col.saturating_add(width) > self.width {
                break;
            }
            self.set(col, y, Cell::styled(ch, style.fg, style.attrs));
            if width == 2 {
                self.set(col + 1, y, Cell::styled(CONTINUATION, style.fg, style.attrs));
            }
            col += width;
        }
        col
    }

    /// Row `y` as plain text, trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        let row = &self.cells[start..start + self.width as usize];
        let text: String = row
            .iter()
            .filter(|cell| !cell.is_continuation())
            .map(|cell| cell.char)
            .collect();
        text.trim_end().to_string()
    }

    /// Reset every cell to default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); width as usize * height as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Rgba};

    #[test]
    fn test_buffer_bounds() {
        let mut buf = FrameBuffer::new(4, 2);
        assert!(buf.set(3, 1, Cell::default()));
        assert!(!buf.set(4, 0, Cell::default()));
        assert!(buf.get(0, 2).is_none());
    }

    #[test]
    fn test_put_str_and_row_text() {
        let mut buf = FrameBuffer::new(10, 1);
        let style = Style::new(Rgba::CYAN, Attr::BOLD);
        let end = buf.put_str(1, 0, "hey", style);
        assert_eq!(end, 4);
        assert_eq!(buf.row_text(0), " hey");
        assert_eq!(buf.get(1, 0).map(|c| c.attrs), Some(Attr::BOLD));
    }

    #[test]
    fn test_put_str_wide_and_truncated() {
        let mut buf = FrameBuffer::new(5, 1);
        let end = buf.put_str(0, 0, "日本語", Style::PLAIN);
        assert_eq!(end, 4);
        assert!(buf.get(1, 0).is_some_and(Cell::is_continuation));
        assert_eq!(buf.row_text(0), "日本");
    }

    #[test]
    fn test_resize_clears() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.put_str(0, 0, "abc", Style::PLAIN);
        buf.resize(2, 2);
        assert_eq!(buf.width(), 2);
        assert_eq!(buf.row_text(0), "");
    }
}
