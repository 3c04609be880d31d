//! Differential renderer for fullscreen mode.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed.
//!
//! # Algorithm
//!
//! 1. Wrap output in a synchronized update
//! 2. For each cell in the new frame:
//!    - If previous frame exists and cell is unchanged: skip
//!    - Otherwise: move, restyle if needed, print
//! 3. Flush the writer once
//! 4. Store current frame as previous for next comparison

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::buffer::FrameBuffer;
use crate::types::{Attr, Cell, Rgba};

/// Differential renderer writing to any [`Write`] (stdout in the binary).
pub struct DiffRenderer<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
    /// Style last emitted, so runs of equal cells skip escape codes.
    pen: Option<(Rgba, Attr)>,
}

impl DiffRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            pen: None,
        }
    }

    /// Render a frame, outputting only changed cells.
    ///
    /// Returns true if any cells were changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let mut has_changes = false;
        queue!(self.out, BeginSynchronizedUpdate)?;
        self.pen = None;

        let width = buffer.width();
        let height = buffer.height();
        let comparable = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        let mut cursor: Option<(u16, u16)> = None;
        for y in 0..height {
            for x in 0..width {
                let Some(cell) = buffer.get(x, y) else { continue };
                let changed = comparable.and_then(|prev| prev.get(x, y)) != Some(cell);
                if !changed || cell.is_continuation() {
                    continue;
                }
                has_changes = true;
                if cursor != Some((x, y)) {
                    queue!(self.out, MoveTo(x, y))?;
                }
                Self::emit(&mut self.out, &mut self.pen, cell)?;
                let advance = if buffer.get(x + 1, y).is_some_and(Cell::is_continuation) { 2 } else { 1 };
                cursor = Some((x + advance, y));
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.previous = Some(buffer.clone());
        Ok(has_changes)
    }

    /// Force a full redraw (no diffing).
    ///
    /// Use this after terminal resize or when the screen is corrupted.
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        self.invalidate();
        queue!(self.out, Clear(ClearType::All))?;
        self.render(buffer).map(|_| ())
    }

    fn emit(out: &mut W, pen: &mut Option<(Rgba, Attr)>, cell: &Cell) -> io::Result<()> {
        if *pen != Some((cell.fg, cell.attrs)) {
            queue!(out, SetAttribute(Attribute::Reset), SetForegroundColor(cell.fg.to_crossterm()))?;
            for (flag, attribute) in ATTRIBUTES {
                if cell.attrs.contains(*flag) {
                    queue!(out, SetAttribute(*attribute))?;
                }
            }
            *pen = Some((cell.fg, cell.attrs));
        }
        queue!(out, Print(cell.char))
    }

    /// Invalidate the previous frame.
    ///
    /// Next render will be a full redraw.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Raw mode, alternate screen, hidden cursor and mouse capture.
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            EnterAlternateScreen,
            Hide,
            EnableMouseCapture,
            Clear(ClearType::All)
        )?;
        self.invalidate();
        Ok(())
    }

    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            DisableMouseCapture,
            Show,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }
}

const ATTRIBUTES: &[(Attr, Attribute)] = &[
    (Attr::BOLD, Attribute::Bold),
    (Attr::DIM, Attribute::Dim),
    (Attr::ITALIC, Attribute::Italic),
    (Attr::UNDERLINE, Attribute::Underlined),
    (Attr::INVERSE, Attribute::Reverse),
];
