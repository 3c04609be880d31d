//! Host - Viewport state between the document and the terminal.
//!
//! Owns the frame buffer, scroll offset, keyboard focus and the hit regions
//! of the last paint. Relayout happens only when the document revision, the
//! viewport or the focus changed.

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::renderer::{hit_test, FrameBuffer, HitRegion, Layout};

use super::input::HostAction;

/// What the event loop should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Screen contents are stale (resize); redraw from scratch.
    Redraw,
    Quit,
}

pub struct Host {
    document: Dom,
    buffer: FrameBuffer,
    layout: Layout,
    hits: Vec<HitRegion>,
    scroll: usize,
    focused: Option<NodeId>,
    /// Document revision of the last paint, None when a repaint is forced.
    painted: Option<u64>,
}

impl Host {
    pub fn new(document: Dom, width: u16, height: u16) -> Self {
        Self {
            document,
            buffer: FrameBuffer::new(width, height),
            layout: Layout::default(),
            hits: Vec::new(),
            scroll: 0,
            focused: None,
            painted: None,
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Repaint if anything changed since the last paint. Returns true when
    /// the buffer was repainted.
    pub fn refresh(&mut self) -> bool {
        let revision = self.document.revision();
        if self.painted == Some(revision) {
            return false;
        }
        let width = self.buffer.width();
        let focused = self.focused.filter(|node| self.document.contains(*node));
        self.focused = focused;
        self.layout = self.document.read(|doc| Layout::compute(doc, width, focused));
        self.scroll = self.scroll.min(self.layout.max_scroll(self.buffer.height()));
        self.hits = self.layout.paint(&mut self.buffer, self.scroll);
        self.painted = Some(revision);
        true
    }

    fn invalidate(&mut self) {
        self.painted = None;
    }

    pub fn handle(&mut self, action: HostAction) -> Step {
        match action {
            HostAction::Quit => return Step::Quit,
            HostAction::Click { row, .. } => {
                if let Some(node) = hit_test(&self.hits, row) {
                    self.focused = Some(node);
                    self.click(node);
                }
            }
            HostAction::FocusNext => self.move_focus(1),
            HostAction::FocusPrev => self.move_focus(-1),
            HostAction::Activate => {
                if let Some(node) = self.focused {
                    self.click(node);
                }
            }
            HostAction::Scroll(lines) => self.scroll_by(lines as isize),
            HostAction::Page(pages) => {
                let page = self.buffer.height().saturating_sub(1).max(1) as isize;
                self.scroll_by(pages as isize * page);
            }
            HostAction::Home => self.scroll_to(0),
            HostAction::End => self.scroll_to(usize::MAX),
            HostAction::Resize { width, height } => {
                self.buffer.resize(width, height);
                self.invalidate();
                return Step::Redraw;
            }
        }
        Step::Continue
    }

    fn click(&mut self, node: NodeId) {
        let handled = self.document.dispatch(node, "click");
        debug!(?node, handled, "click");
        self.invalidate();
    }

    fn move_focus(&mut self, delta: isize) {
        let clickables = &self.layout.clickables;
        if clickables.is_empty() {
            return;
        }
        let len = clickables.len() as isize;
        let next = match self.focused.and_then(|f| clickables.iter().position(|n| *n == f)) {
            Some(index) => (index as isize + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        let node = clickables[next as usize];
        self.focused = Some(node);
        if let Some(line) = self.layout.line_of(node) {
            self.reveal(line);
        }
        self.invalidate();
    }

    /// Scroll the minimum needed to bring `line` into view.
    fn reveal(&mut self, line: usize) {
        let rows = self.buffer.height() as usize;
        if line < self.scroll {
            self.scroll = line;
        } else if rows > 0 && line >= self.scroll + rows {
            self.scroll = line + 1 - rows;
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll.saturating_add_signed(delta);
        self.scroll_to(target);
    }

    fn scroll_to(&mut self, target: usize) {
        let clamped = target.min(self.layout.max_scroll(self.buffer.height()));
        if clamped != self.scroll {
            self.scroll = clamped;
            self.invalidate();
        }
    }
}
